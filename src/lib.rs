//! Channel Reaper — scheduled retirement of silent workspace channels.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod slack;
pub mod sweep;
