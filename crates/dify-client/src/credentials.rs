//! Credential scopes and the per-client credential store.
//!
//! Dify issues different API keys for app, knowledge-base and workflow
//! access. Each request names the [`Scope`] whose key authorizes it; the
//! [`Credentials`] store resolves that scope to a bearer secret.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use dify_config::DEFAULT_SCOPE;

use crate::error::{Error, Result};

/// A named credential context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// App key used by chat, completion, conversation, file and feedback calls.
    Default,
    /// Knowledge-base key used by dataset, document, segment and tag calls.
    Dataset,
    /// Key for app configuration endpoints.
    App,
    /// Key for workflow execution.
    Workflow,
}

impl Scope {
    /// Every known scope.
    pub const ALL: [Scope; 4] = [Scope::Default, Scope::Dataset, Scope::App, Scope::Workflow];

    /// The scope's name in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Default => DEFAULT_SCOPE,
            Scope::Dataset => "dataset",
            Scope::App => "app",
            Scope::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown credential scope '{s}'")))
    }
}

/// Immutable mapping from scope to bearer secret.
///
/// The [`Scope::Default`] entry is always present and every secret is
/// non-empty; both are checked at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    secrets: BTreeMap<Scope, String>,
}

impl Credentials {
    /// Bind a single secret to the default scope.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_scopes([(Scope::Default, api_key.into())])
    }

    /// Build from explicit scope/secret pairs.
    ///
    /// Fails if any secret is empty or if no default secret is given.
    pub fn from_scopes<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Scope, S)>,
        S: Into<String>,
    {
        let mut secrets = BTreeMap::new();
        for (scope, secret) in entries {
            let secret = secret.into();
            if secret.trim().is_empty() {
                return Err(Error::Config(format!(
                    "credential for scope '{scope}' is empty"
                )));
            }
            secrets.insert(scope, secret);
        }
        if !secrets.contains_key(&Scope::Default) {
            return Err(Error::Config(format!(
                "a '{}' credential is required",
                Scope::Default
            )));
        }
        Ok(Self { secrets })
    }

    /// Build from scope names as they appear in configuration.
    ///
    /// Unknown scope names are rejected here rather than at request time.
    pub fn from_named<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let parsed = entries
            .into_iter()
            .map(|(name, secret)| Ok((name.parse::<Scope>()?, secret)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_scopes(parsed)
    }

    /// Resolve the secret for a scope.
    pub fn resolve(&self, scope: Scope) -> Result<&str> {
        self.secrets
            .get(&scope)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Config(format!("no credential configured for scope '{scope}'"))
            })
    }

    /// Check whether a scope has a secret.
    pub fn contains(&self, scope: Scope) -> bool {
        self.secrets.contains_key(&scope)
    }

    /// Scopes that have a secret, in declaration order.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.secrets.keys().copied()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scopes", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_secret_binds_default() {
        let creds = Credentials::new("app-key").unwrap();
        assert_eq!(creds.resolve(Scope::Default).unwrap(), "app-key");
        assert_eq!(creds.scopes().collect::<Vec<_>>(), vec![Scope::Default]);
    }

    #[test]
    fn test_undeclared_scope_is_config_error() {
        let creds = Credentials::new("app-key").unwrap();
        let err = creds.resolve(Scope::Dataset).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("dataset")));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(Credentials::new(""), Err(Error::Config(_))));
        assert!(matches!(Credentials::new("   "), Err(Error::Config(_))));
    }

    #[test]
    fn test_mapping_requires_default() {
        let err = Credentials::from_scopes([(Scope::Dataset, "dataset-key")]).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("default")));
    }

    #[test]
    fn test_mapping_resolves_each_scope() {
        let creds = Credentials::from_scopes([
            (Scope::Default, "app-key"),
            (Scope::Dataset, "dataset-key"),
            (Scope::Workflow, "wf-key"),
        ])
        .unwrap();
        assert_eq!(creds.resolve(Scope::Dataset).unwrap(), "dataset-key");
        assert_eq!(creds.resolve(Scope::Workflow).unwrap(), "wf-key");
        assert!(!creds.contains(Scope::App));
    }

    #[test]
    fn test_from_named_rejects_unknown_scope() {
        let err = Credentials::from_named([("default", "k"), ("billing", "b")]).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("billing")));
    }

    #[test]
    fn test_scope_round_trips_through_name() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("super-secret").unwrap();
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
