//! Credential scope names and their environment variables.
//!
//! A scope name selects which bearer secret authorizes a call. The
//! `default` scope is mandatory; the others are optional and only needed
//! by the resource families that use them.

/// Name of the mandatory scope.
pub const DEFAULT_SCOPE: &str = "default";

/// Scope name to environment variable holding its secret.
pub const CREDENTIAL_ENV_VARS: &[(&str, &str)] = &[
    (DEFAULT_SCOPE, "DIFY_API_KEY"),
    ("dataset", "DIFY_DATASET_KEY"),
    ("app", "DIFY_APP_KEY"),
    ("workflow", "DIFY_WORKFLOW_KEY"),
];
