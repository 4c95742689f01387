//! Workspace client abstraction and the Slack Web API implementation.

pub mod client;
pub mod types;

pub use client::{SlackClient, WorkspaceClient};
pub use types::{Channel, Message};
