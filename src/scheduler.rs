//! Cron-driven sweep scheduler.
//!
//! A single task computes the next fire time in the schedule timezone,
//! sleeps until it, and runs the sweep inline. Awaiting the sweep inside the
//! loop serializes runs: a hung sweep delays the next trigger's effective
//! start instead of stacking overlapping sweeps (the `Sweeper` additionally
//! guards itself against out-of-band callers). A failed sweep is logged and
//! the schedule continues.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::SCHEDULE_TIMEZONE;
use crate::sweep::Sweeper;

/// Next fire time of `schedule` after `now`, evaluated in the schedule
/// timezone. `None` when the schedule has no future runs.
pub fn next_fire(schedule: &cron::Schedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let local_now = now.with_timezone(&SCHEDULE_TIMEZONE);
    schedule
        .after(&local_now)
        .next()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Register the sweep on its recurring schedule. Runs until aborted.
pub fn spawn_scheduler(sweeper: Arc<Sweeper>, schedule: cron::Schedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(timezone = %SCHEDULE_TIMEZONE, schedule = %schedule, "Sweep schedule registered");

        loop {
            let now = Utc::now();
            let Some(next) = next_fire(&schedule, now) else {
                warn!("Schedule has no future fire times, scheduler stopping");
                return;
            };

            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, wait_secs = wait.as_secs(), "Next sweep scheduled");
            tokio::time::sleep(wait).await;

            debug!("Sweep triggered");
            match sweeper.run_sweep().await {
                Ok(report) => {
                    debug!(?report, "Scheduled sweep finished");
                }
                Err(e) => {
                    // The schedule stays armed regardless of sweep failures.
                    error!("Sweep failed: {e}");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_cron;

    #[test]
    fn next_fire_is_in_the_future() {
        let schedule = parse_cron("0 8 * * *").unwrap();
        let now = Utc::now();
        let next = next_fire(&schedule, now).unwrap();
        assert!(next > now);
    }

    #[test]
    fn next_fire_respects_timezone() {
        let schedule = parse_cron("0 8 * * *").unwrap();
        // 2024-02-01T00:00:00Z; Chicago is CST (UTC-6) in winter, so 08:00
        // local is 14:00 UTC.
        let now = DateTime::from_timestamp(1_706_745_600, 0).unwrap();
        let next = next_fire(&schedule, now).unwrap();
        assert_eq!(next.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn every_second_schedule_fires_soon() {
        let schedule = parse_cron("* * * * * *").unwrap();
        let now = Utc::now();
        let next = next_fire(&schedule, now).unwrap();
        assert!(next - now <= chrono::Duration::seconds(2));
    }
}
