//! Wire types for the workspace API.

use serde::Deserialize;

/// A conversation in the workspace, as returned by `conversations.list`.
///
/// The id is optional on the wire: entries without one cannot be acted on
/// and are skipped (with a diagnostic) by the sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Whether the bot is already a member. Warn posts only need a join
    /// call when this is false.
    #[serde(default)]
    pub is_member: bool,
}

/// A message in a channel's history. Only authorship and text matter to the
/// sweep; recency is enforced server-side via the `oldest` parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Author user id. System and bot-integration messages may carry none.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
}

impl Message {
    /// Whether this message was written by a human, i.e. by any author other
    /// than the bot itself. Authorless messages (system events, integration
    /// posts) do not count as human activity.
    pub fn is_human(&self, bot_user_id: &str) -> bool {
        match self.user.as_deref() {
            Some(user) => user != bot_user_id,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_deserializes_without_id() {
        let ch: Channel = serde_json::from_str(r#"{"name": "general"}"#).unwrap();
        assert!(ch.id.is_none());
        assert_eq!(ch.name, "general");
        assert!(!ch.is_member);
    }

    #[test]
    fn channel_deserializes_full() {
        let ch: Channel =
            serde_json::from_str(r#"{"id": "C123", "name": "general", "is_member": true}"#)
                .unwrap();
        assert_eq!(ch.id.as_deref(), Some("C123"));
        assert!(ch.is_member);
    }

    #[test]
    fn human_authorship() {
        let msg: Message =
            serde_json::from_str(r#"{"user": "U1", "text": "hi", "ts": "1.0"}"#).unwrap();
        assert!(msg.is_human("UBOT"));
        assert!(!msg.is_human("U1"));
    }

    #[test]
    fn authorless_message_is_not_human() {
        let msg: Message = serde_json::from_str(r#"{"text": "channel_join"}"#).unwrap();
        assert!(!msg.is_human("UBOT"));
    }
}
