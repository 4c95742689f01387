//! Slack Web API client.
//!
//! Thin reqwest wrapper over the five conversation operations the sweep
//! consumes, plus `auth.test` for learning the bot's own user id. Slack
//! signals API errors as HTTP 200 with `"ok": false`; those are surfaced as
//! `ClientError::Api`. A single retry honoring `Retry-After` is applied on
//! HTTP 429 — the only rate-limit handling the engine does.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;

use crate::config::SweepConfig;
use crate::error::ClientError;
use crate::slack::types::{Channel, Message};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Abstract workspace operations the sweep consumes. The seam for tests.
#[async_trait]
pub trait WorkspaceClient: Send + Sync {
    /// List all non-archived channels in the workspace.
    async fn list_channels(&self) -> Result<Vec<Channel>, ClientError>;

    /// Fetch a channel's message history, newest first, bounded below by
    /// `oldest`.
    async fn history(
        &self,
        channel_id: &str,
        oldest: DateTime<Utc>,
    ) -> Result<Vec<Message>, ClientError>;

    /// Join a channel so the bot may post into it.
    async fn join(&self, channel_id: &str) -> Result<(), ClientError>;

    /// Post a plain text message to a channel.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), ClientError>;

    /// Archive a channel.
    async fn archive(&self, channel_id: &str) -> Result<(), ClientError>;
}

/// Workspace client backed by the Slack Web API.
pub struct SlackClient {
    token: secrecy::SecretString,
    client: reqwest::Client,
    base_url: String,
}

impl SlackClient {
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            token: config.token.clone(),
            client: reqwest::Client::new(),
            base_url: SLACK_API_BASE.to_string(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Call `auth.test` and return the bot's own user id. Done once at
    /// startup; the classifier needs it to tell the bot's messages apart
    /// from human ones.
    pub async fn bot_user_id(&self) -> Result<String, ClientError> {
        let body = self.post("auth.test", serde_json::json!({})).await?;
        body.get("user_id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| ClientError::Decode {
                method: "auth.test".to_string(),
                reason: "response missing user_id".to_string(),
            })
    }

    /// GET a read method with query parameters.
    async fn get(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ClientError> {
        let send = || {
            self.client
                .get(self.api_url(method))
                .bearer_auth(self.token.expose_secret())
                .query(params)
                .send()
        };

        let resp = send().await.map_err(|e| ClientError::Http {
            method: method.to_string(),
            reason: e.to_string(),
        })?;
        let resp = self.retry_if_limited(method, resp, send).await?;
        Self::unwrap_envelope(method, resp).await
    }

    /// POST a write method with a JSON body.
    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let send = || {
            self.client
                .post(self.api_url(method))
                .bearer_auth(self.token.expose_secret())
                .json(&body)
                .send()
        };

        let resp = send().await.map_err(|e| ClientError::Http {
            method: method.to_string(),
            reason: e.to_string(),
        })?;
        let resp = self.retry_if_limited(method, resp, send).await?;
        Self::unwrap_envelope(method, resp).await
    }

    /// On HTTP 429, wait out `Retry-After` and retry once. A second 429
    /// surfaces as `ClientError::RateLimited`.
    async fn retry_if_limited<F, Fut>(
        &self,
        method: &str,
        resp: reqwest::Response,
        send: F,
    ) -> Result<reqwest::Response, ClientError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = reqwest::Result<reqwest::Response>>,
    {
        if resp.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(resp);
        }

        let retry_after = parse_retry_after(&resp);
        tracing::warn!(
            method,
            retry_after_secs = retry_after.as_secs(),
            "Rate limited, retrying once"
        );
        tokio::time::sleep(retry_after).await;

        let retried = send().await.map_err(|e| ClientError::Http {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        if retried.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited {
                method: method.to_string(),
                retry_after: Some(parse_retry_after(&retried)),
            });
        }
        Ok(retried)
    }

    /// Decode the `{ok, error, ...}` envelope every Slack method returns.
    async fn unwrap_envelope(
        method: &str,
        resp: reqwest::Response,
    ) -> Result<serde_json::Value, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                method: method.to_string(),
                reason: format!("status {status}"),
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| ClientError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })?;

        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let reason = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown_error")
                .to_string();
            return Err(ClientError::Api {
                method: method.to_string(),
                reason,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WorkspaceClient for SlackClient {
    async fn list_channels(&self) -> Result<Vec<Channel>, ClientError> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut params = vec![
                ("types", "public_channel"),
                ("exclude_archived", "true"),
                ("limit", "1000"),
            ];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.as_str()));
            }

            let body = self.get("conversations.list", &params).await?;

            let page: Vec<Channel> = body
                .get("channels")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| ClientError::Decode {
                    method: "conversations.list".to_string(),
                    reason: e.to_string(),
                })?
                .unwrap_or_default();
            channels.extend(page);

            cursor = body
                .get("response_metadata")
                .and_then(|m| m.get("next_cursor"))
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string();
            if cursor.is_empty() {
                break;
            }
        }

        Ok(channels)
    }

    async fn history(
        &self,
        channel_id: &str,
        oldest: DateTime<Utc>,
    ) -> Result<Vec<Message>, ClientError> {
        let oldest_ts = format!("{}.000000", oldest.timestamp());
        let params = [
            ("channel", channel_id),
            ("oldest", oldest_ts.as_str()),
            ("limit", "1000"),
        ];

        let body = self.get("conversations.history", &params).await?;

        body.get("messages")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ClientError::Decode {
                method: "conversations.history".to_string(),
                reason: e.to_string(),
            })
            .map(Option::unwrap_or_default)
    }

    async fn join(&self, channel_id: &str) -> Result<(), ClientError> {
        self.post(
            "conversations.join",
            serde_json::json!({ "channel": channel_id }),
        )
        .await
        .map(|_| ())
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), ClientError> {
        self.post(
            "chat.postMessage",
            serde_json::json!({ "channel": channel_id, "text": text }),
        )
        .await
        .map(|_| ())
    }

    async fn archive(&self, channel_id: &str) -> Result<(), ClientError> {
        self.post(
            "conversations.archive",
            serde_json::json!({ "channel": channel_id }),
        )
        .await
        .map(|_| ())
    }
}

/// Read a `Retry-After` header, defaulting to a few seconds when absent.
fn parse_retry_after(resp: &reqwest::Response) -> Duration {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(3))
}
