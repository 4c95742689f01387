//! Error types for the channel retirement engine.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Workspace client error: {0}")]
    Client(#[from] ClientError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),
}

/// Configuration-related errors. Any of these prevents the scheduler from
/// being registered at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid cron expression '{expr}': {message}")]
    InvalidCron { expr: String, message: String },
}

/// Failures of individual Workspace Client calls. Always caught at the call
/// site, never propagated past the enclosing loop iteration.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request for {method} failed: {reason}")]
    Http { method: String, reason: String },

    #[error("Slack API {method} returned an error: {reason}")]
    Api { method: String, reason: String },

    #[error("Rate limited on {method}, retry after {retry_after:?}")]
    RateLimited {
        method: String,
        retry_after: Option<Duration>,
    },

    #[error("Failed to decode {method} response: {reason}")]
    Decode { method: String, reason: String },
}

/// Failures of sweep-critical steps. Aborts only the current sweep iteration;
/// the scheduler stays armed for the next trigger.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("Channel listing failed: {0}")]
    ListChannels(#[source] ClientError),

    #[error("A sweep is already in progress")]
    AlreadyRunning,
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_client_error() -> Result<()> {
        Err(ClientError::Api {
            method: "auth.test".to_string(),
            reason: "invalid_auth".to_string(),
        })?
    }

    #[test]
    fn sub_errors_convert_into_top_level() {
        let err = fails_with_client_error().unwrap_err();
        assert!(matches!(err, Error::Client(ClientError::Api { .. })));

        let err: Error = ConfigError::MissingEnvVar("SLACK_TOKEN".to_string()).into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = SweepError::AlreadyRunning.into();
        assert!(matches!(err, Error::Sweep(_)));
    }

    #[test]
    fn display_includes_source_context() {
        let err = fails_with_client_error().unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("auth.test"));
        assert!(rendered.contains("invalid_auth"));
    }
}
