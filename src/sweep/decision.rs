//! Per-channel retirement decision.
//!
//! The engine keeps no state between sweeps: the count of its own prior
//! warning messages inside the lookback window is the durable memory of
//! "already warned". The cost of that choice is that the threshold is tied
//! to the window retaining enough history to count prior warnings; window
//! drift can delay or accelerate the transition.

use crate::config::WARNINGS_BEFORE_ARCHIVE;
use crate::sweep::activity::ChannelActivity;

/// What to do with a channel this sweep. Computed fresh every sweep, never
/// persisted. `Warn` and `Archive` are mutually exclusive for a channel
/// within one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The channel has human activity; leave it alone.
    None,
    /// Silent, but not yet warned enough times.
    Warn,
    /// Silent with more than the threshold count of prior warnings.
    Archive,
}

/// Decide a silent channel's fate from its in-window activity.
pub fn decide(activity: &ChannelActivity) -> Decision {
    if !activity.is_silent {
        return Decision::None;
    }
    if activity.warning_count > WARNINGS_BEFORE_ARCHIVE {
        Decision::Archive
    } else {
        Decision::Warn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(is_silent: bool, warning_count: usize) -> ChannelActivity {
        ChannelActivity {
            is_silent,
            warning_count,
        }
    }

    #[test]
    fn active_channel_is_left_alone() {
        for count in [0, 3, 10] {
            assert_eq!(decide(&activity(false, count)), Decision::None);
        }
    }

    #[test]
    fn silent_below_threshold_is_warned() {
        for count in 0..=WARNINGS_BEFORE_ARCHIVE {
            assert_eq!(
                decide(&activity(true, count)),
                Decision::Warn,
                "warning_count={count}"
            );
        }
    }

    #[test]
    fn silent_above_threshold_is_archived() {
        for count in [WARNINGS_BEFORE_ARCHIVE + 1, 6, 100] {
            assert_eq!(
                decide(&activity(true, count)),
                Decision::Archive,
                "warning_count={count}"
            );
        }
    }

    #[test]
    fn exactly_five_warnings_archives() {
        assert_eq!(decide(&activity(true, 5)), Decision::Archive);
    }
}
