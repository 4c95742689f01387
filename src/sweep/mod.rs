//! Channel retirement sweep: classification, decision, orchestration.

pub mod activity;
pub mod decision;
pub mod orchestrator;

pub use activity::{ChannelActivity, LookbackWindow};
pub use decision::Decision;
pub use orchestrator::{SweepReport, Sweeper};
