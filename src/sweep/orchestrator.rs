//! The sweep itself: list, classify, decide, act.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::WARNING_TEXT;
use crate::error::SweepError;
use crate::slack::{Channel, WorkspaceClient};
use crate::sweep::activity::{self, LookbackWindow};
use crate::sweep::decision::{self, Decision};

/// Outcome counts for one sweep, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Channels that were classified.
    pub swept: usize,
    /// Channels skipped for having no id or a failed history fetch.
    pub skipped: usize,
    /// Warnings successfully posted.
    pub warned: usize,
    /// Channels successfully archived.
    pub archived: usize,
    /// Failed warn or archive attempts.
    pub failed_actions: usize,
}

/// Drives one retirement pass over all channels.
pub struct Sweeper {
    client: Arc<dyn WorkspaceClient>,
    bot_user_id: String,
    lookback_days: i64,
    /// At most one sweep runs at a time.
    running: tokio::sync::Mutex<()>,
}

impl Sweeper {
    pub fn new(client: Arc<dyn WorkspaceClient>, bot_user_id: String, lookback_days: i64) -> Self {
        Self {
            client,
            bot_user_id,
            lookback_days,
            running: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one complete sweep.
    ///
    /// Channel listing failure aborts the whole sweep; everything after that
    /// is best-effort per channel — one channel's failure never stops the
    /// rest. Every channel in the warn and archive sets is attempted exactly
    /// once.
    pub async fn run_sweep(&self) -> Result<SweepReport, SweepError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| SweepError::AlreadyRunning)?;

        let channels = self
            .client
            .list_channels()
            .await
            .map_err(SweepError::ListChannels)?;
        debug!(count = channels.len(), "Listed channels");

        // One window per sweep, so every channel is judged against the same
        // instant.
        let window = LookbackWindow::starting(Utc::now(), self.lookback_days);

        let mut report = SweepReport::default();
        let mut to_warn: Vec<Channel> = Vec::new();
        let mut to_archive: Vec<Channel> = Vec::new();

        for channel in channels {
            let Some(id) = channel.id.clone() else {
                warn!(name = %channel.name, "Channel has no id, skipping");
                report.skipped += 1;
                continue;
            };

            let messages = match self.client.history(&id, window.oldest()).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(channel = %id, "History fetch failed, skipping: {e}");
                    report.skipped += 1;
                    continue;
                }
            };

            let activity = activity::classify(&messages, &self.bot_user_id, WARNING_TEXT);
            report.swept += 1;

            match decision::decide(&activity) {
                Decision::None => {}
                Decision::Warn => {
                    debug!(
                        channel = %id,
                        warnings = activity.warning_count,
                        days = self.lookback_days,
                        "No human messages in window, will warn"
                    );
                    to_warn.push(channel);
                }
                Decision::Archive => {
                    debug!(
                        channel = %id,
                        warnings = activity.warning_count,
                        "Warned enough, will archive"
                    );
                    to_archive.push(channel);
                }
            }
        }

        for channel in &to_warn {
            self.warn_channel(channel, &mut report).await;
        }

        for channel in &to_archive {
            // Id-less channels never reach the decision sets.
            let Some(id) = channel.id.as_deref() else {
                continue;
            };
            match self.client.archive(id).await {
                Ok(()) => {
                    info!(channel = %id, name = %channel.name, "Archived channel");
                    report.archived += 1;
                }
                Err(e) => {
                    warn!(channel = %id, "Archive failed: {e}");
                    report.failed_actions += 1;
                }
            }
        }

        info!(
            swept = report.swept,
            skipped = report.skipped,
            warned = report.warned,
            archived = report.archived,
            failed = report.failed_actions,
            "Sweep complete"
        );
        Ok(report)
    }

    /// Join (when not already a member) and post the canonical warning.
    /// A join failure skips the post for this channel only.
    async fn warn_channel(&self, channel: &Channel, report: &mut SweepReport) {
        let Some(id) = channel.id.as_deref() else {
            return;
        };

        if !channel.is_member {
            if let Err(e) = self.client.join(id).await {
                warn!(channel = %id, "Join failed, skipping warning: {e}");
                report.failed_actions += 1;
                return;
            }
        }

        match self.client.post_message(id, WARNING_TEXT).await {
            Ok(()) => {
                info!(channel = %id, name = %channel.name, "Posted inactivity warning");
                report.warned += 1;
            }
            Err(e) => {
                warn!(channel = %id, "Warning post failed: {e}");
                report.failed_actions += 1;
            }
        }
    }
}
