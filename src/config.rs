//! Configuration types, loaded from the process environment.

use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Timezone the sweep schedule is evaluated in.
pub const SCHEDULE_TIMEZONE: chrono_tz::Tz = chrono_tz::America::Chicago;

/// Canonical warning text posted to silent channels. Prior warnings are
/// detected by exact match against this string, so it must never vary
/// between the posting and counting sides.
pub const WARNING_TEXT: &str =
    "This channel is inactive and will be exterminated :exterminate: tomorrow \
     if no activity is recorded";

/// A channel is archived only once more than this many warnings already
/// exist inside the lookback window.
pub const WARNINGS_BEFORE_ARCHIVE: usize = 4;

/// Sweep configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Bot token for the workspace API.
    pub token: SecretString,
    /// Lookback window length: a channel with no human message in the last
    /// N days is considered silent.
    pub days_since_last_interaction: i64,
    /// Cron expression (seven-field, normalized) driving the sweep.
    pub schedule: cron::Schedule,
}

impl SweepConfig {
    /// Load configuration from the environment.
    ///
    /// Required: `SLACK_TOKEN`. Optional: `DAYS_SINCE_LAST_INTERACTION`
    /// (default 30), `AUTO_ARCHIVE_CRON` (default: daily at 08:00).
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("SLACK_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("SLACK_TOKEN".to_string()))?;

        let days_since_last_interaction = match std::env::var("DAYS_SINCE_LAST_INTERACTION") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "DAYS_SINCE_LAST_INTERACTION".to_string(),
                    message: format!("expected a positive integer, got '{raw}'"),
                })?,
            Err(_) => 30,
        };

        let cron_expr =
            std::env::var("AUTO_ARCHIVE_CRON").unwrap_or_else(|_| "0 0 8 * * *".to_string());
        let schedule = parse_cron(&cron_expr)?;

        Ok(Self {
            token: SecretString::from(token),
            days_since_last_interaction,
            schedule,
        })
    }
}

/// Parse a cron expression, accepting both the seven-field form the `cron`
/// crate expects and the common five-field form (min hour dom month dow),
/// which gets a "0" seconds prefix and "*" year suffix.
pub fn parse_cron(expr: &str) -> Result<cron::Schedule, ConfigError> {
    cron::Schedule::from_str(expr)
        .or_else(|_| cron::Schedule::from_str(&format!("0 {expr} *")))
        .map_err(|e| ConfigError::InvalidCron {
            expr: expr.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cron_seven_field() {
        assert!(parse_cron("0 0 8 * * * *").is_ok());
    }

    #[test]
    fn parse_cron_five_field_padded() {
        assert!(parse_cron("0 8 * * *").is_ok());
    }

    #[test]
    fn parse_cron_invalid() {
        let err = parse_cron("every tuesday").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCron { .. }));
    }

    #[test]
    fn warning_threshold_matches_archive_rule() {
        // Archive requires strictly more than this many prior warnings.
        assert_eq!(WARNINGS_BEFORE_ARCHIVE, 4);
    }
}
