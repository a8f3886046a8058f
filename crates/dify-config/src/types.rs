//! Configuration types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::secrets::{CREDENTIAL_ENV_VARS, DEFAULT_SCOPE};
use crate::{ConfigError, Result};

/// Default service address.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai";

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default backoff factor in seconds.
pub const DEFAULT_RETRY_BACKOFF_FACTOR: f64 = 1.0;

/// Client configuration as read from disk and the environment.
///
/// Every field is optional in the TOML source; missing keys take the
/// defaults above. Credentials are keyed by scope name.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifyConfig {
    /// Base address of the remote service.
    pub base_url: String,
    /// Per-attempt timeout in seconds.
    pub timeout_secs: f64,
    /// Retries after the first attempt for transient failures.
    pub retries: u32,
    /// Backoff factor in seconds; the delay before retry `k` is `factor * 2^k`.
    pub retry_backoff_factor: f64,
    /// Scope name to bearer secret.
    pub credentials: BTreeMap<String, String>,
}

impl Default for DifyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_backoff_factor: DEFAULT_RETRY_BACKOFF_FACTOR,
            credentials: BTreeMap::new(),
        }
    }
}

// Secrets never reach log output.
impl fmt::Debug for DifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DifyConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("retries", &self.retries)
            .field("retry_backoff_factor", &self.retry_backoff_factor)
            .field("credentials", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DifyConfig {
    /// Create a config with defaults and a single `default` credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config
            .credentials
            .insert(DEFAULT_SCOPE.to_string(), api_key.into());
        config
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Get the secret bound to a scope name, if any.
    pub fn credential(&self, scope: &str) -> Option<&str> {
        self.credentials.get(scope).map(String::as_str)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. Numeric variables that fail to
    /// parse are reported as [`ConfigError::InvalidValue`].
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DIFY_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = get("DIFY_TIMEOUT") {
            self.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("DIFY_TIMEOUT", format!("'{raw}' is not a number")))?;
        }
        if let Some(raw) = get("DIFY_RETRIES") {
            self.retries = raw.trim().parse().map_err(|_| {
                ConfigError::invalid("DIFY_RETRIES", format!("'{raw}' is not a non-negative integer"))
            })?;
        }
        if let Some(raw) = get("DIFY_RETRY_BACKOFF") {
            self.retry_backoff_factor = raw.trim().parse().map_err(|_| {
                ConfigError::invalid("DIFY_RETRY_BACKOFF", format!("'{raw}' is not a number"))
            })?;
        }
        for (scope, var) in CREDENTIAL_ENV_VARS {
            if let Some(secret) = get(var) {
                self.credentials.insert((*scope).to_string(), secret);
            }
        }
        Ok(())
    }

    /// Check that the config can be used to build a client.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", "must not be empty"));
        }
        check_seconds("timeout_secs", self.timeout_secs)?;
        check_seconds("retry_backoff_factor", self.retry_backoff_factor)?;

        for (scope, secret) in &self.credentials {
            if secret.trim().is_empty() {
                return Err(ConfigError::MissingCredential(scope.clone()));
            }
        }
        if !self.credentials.contains_key(DEFAULT_SCOPE) {
            return Err(ConfigError::MissingCredential(DEFAULT_SCOPE.to_string()));
        }
        Ok(())
    }
}

fn check_seconds(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("{value} is not a finite, non-negative number of seconds"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DifyConfig::default();
        assert_eq!(config.base_url, "https://api.dify.ai");
        assert_eq!(config.timeout_secs, 30.0);
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_backoff_factor, 1.0);
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_from_toml_full() {
        let config = DifyConfig::from_toml(
            r#"
base_url = "http://localhost:5001"
timeout_secs = 12.5
retries = 5
retry_backoff_factor = 0.25

[credentials]
default = "app-key"
dataset = "dataset-key"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:5001");
        assert_eq!(config.timeout_secs, 12.5);
        assert_eq!(config.retries, 5);
        assert_eq!(config.retry_backoff_factor, 0.25);
        assert_eq!(config.credential("default"), Some("app-key"));
        assert_eq!(config.credential("dataset"), Some("dataset-key"));
        assert_eq!(config.credential("workflow"), None);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let config = DifyConfig::from_toml("retries = 0\n").unwrap();
        assert_eq!(config.retries, 0);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_toml_rejects_negative_retries() {
        assert!(DifyConfig::from_toml("retries = -1\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DifyConfig::default();
        config
            .apply_env_overrides(env(&[
                ("DIFY_BASE_URL", "http://dify.internal"),
                ("DIFY_TIMEOUT", "5"),
                ("DIFY_RETRIES", "1"),
                ("DIFY_RETRY_BACKOFF", "0.5"),
                ("DIFY_API_KEY", "app-key"),
                ("DIFY_WORKFLOW_KEY", "wf-key"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://dify.internal");
        assert_eq!(config.timeout_secs, 5.0);
        assert_eq!(config.retries, 1);
        assert_eq!(config.retry_backoff_factor, 0.5);
        assert_eq!(config.credential("default"), Some("app-key"));
        assert_eq!(config.credential("workflow"), Some("wf-key"));
        assert_eq!(config.credential("dataset"), None);
    }

    #[test]
    fn test_env_empty_values_ignored() {
        let mut config = DifyConfig::with_api_key("from-file");
        config
            .apply_env_overrides(env(&[("DIFY_API_KEY", ""), ("DIFY_BASE_URL", "  ")]))
            .unwrap();
        assert_eq!(config.credential("default"), Some("from-file"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_bad_number() {
        let mut config = DifyConfig::default();
        let err = config
            .apply_env_overrides(env(&[("DIFY_RETRIES", "three")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "DIFY_RETRIES"));
    }

    #[test]
    fn test_validate_requires_default_credential() {
        let mut config = DifyConfig::default();
        config
            .credentials
            .insert("dataset".to_string(), "dataset-key".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(ref s) if s == "default"));
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = DifyConfig::with_api_key("app-key");
        config.credentials.insert("app".to_string(), String::new());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(ref s) if s == "app"));
    }

    #[test]
    fn test_validate_rejects_negative_timeout() {
        let mut config = DifyConfig::with_api_key("app-key");
        config.timeout_secs = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.timeout_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = DifyConfig::with_api_key("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("default"));
    }
}
