//! Self-state monitoring
//!
//! Decides whether the pipeline as a whole is healthy and when to say so.

mod config;
mod monitor;
mod notice;

pub use config::{SelfStateConfig, SelfStateSettings};
pub use monitor::{
    AlertDispatchRecord, DimensionStatus, Evaluation, Inspection, MonitorAction,
    SelfStateMonitor,
};
pub use notice::{NoticeKind, SelfStateNotice};
