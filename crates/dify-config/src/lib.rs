//! Configuration for the Dify client SDK.
//!
//! Provides TOML-based configuration with:
//! - Service address, per-attempt timeout, retry count and backoff factor
//! - Named credential scopes (`[credentials]` table: `default`, `dataset`, `app`, `workflow`)
//! - Config file discovery (XDG user config, overridable via `DIFY_CONFIG_DIR`)
//! - Environment variable overrides (`DIFY_BASE_URL`, `DIFY_API_KEY`, ...)
//!
//! ```toml
//! base_url = "https://api.dify.ai"
//! timeout_secs = 30.0
//! retries = 3
//! retry_backoff_factor = 1.0
//!
//! [credentials]
//! default = "app-xxxxxxxx"
//! dataset = "dataset-xxxxxxxx"
//! ```

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{load_config, load_config_file, xdg_config_dir, xdg_config_path};
pub use error::{ConfigError, Result};
pub use secrets::{CREDENTIAL_ENV_VARS, DEFAULT_SCOPE};
pub use types::DifyConfig;
