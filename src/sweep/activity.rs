//! Activity classification for a single channel.

use chrono::{DateTime, Duration, Utc};

use crate::slack::Message;

/// The start of the trailing interval used to judge recent activity.
/// Computed once per sweep and reused for every channel so all channels are
/// judged against the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow(pub DateTime<Utc>);

impl LookbackWindow {
    /// `now - days`.
    pub fn starting(now: DateTime<Utc>, days: i64) -> Self {
        Self(now - Duration::days(days))
    }

    pub fn oldest(&self) -> DateTime<Utc> {
        self.0
    }
}

/// What a channel's in-window history says about it.
#[derive(Debug, Clone)]
pub struct ChannelActivity {
    /// No human-authored messages in the window.
    pub is_silent: bool,
    /// Bot-authored messages exactly matching the canonical warning text.
    pub warning_count: usize,
}

/// Classify a channel's in-window messages.
///
/// A message is human iff its author id exists and differs from the bot's
/// own id. Warnings are counted from the same fetch: bot-authored messages
/// whose text exactly equals `warning_text`.
pub fn classify(messages: &[Message], bot_user_id: &str, warning_text: &str) -> ChannelActivity {
    let is_silent = !messages.iter().any(|m| m.is_human(bot_user_id));

    let warning_count = messages
        .iter()
        .filter(|m| m.user.as_deref() == Some(bot_user_id) && m.text == warning_text)
        .count();

    ChannelActivity {
        is_silent,
        warning_count,
    }
}
