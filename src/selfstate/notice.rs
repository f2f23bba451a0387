//! Self-state notices
//!
//! The message handed to every contact when the monitor alerts or recovers.

use crate::domain::BreachReason;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// The pipeline is degraded
    Alert,
    /// The pipeline recovered
    Recovery,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert => write!(f, "ALERT"),
            Self::Recovery => write!(f, "RECOVERY"),
        }
    }
}

/// One notice dispatched to all contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfStateNotice {
    pub kind: NoticeKind,
    pub reasons: Vec<BreachReason>,
    /// Unix seconds
    pub sent_at: i64,
}

impl SelfStateNotice {
    pub fn alert(reasons: Vec<BreachReason>, sent_at: i64) -> Self {
        Self {
            kind: NoticeKind::Alert,
            reasons,
            sent_at,
        }
    }

    pub fn recovery(sent_at: i64) -> Self {
        Self {
            kind: NoticeKind::Recovery,
            reasons: Vec::new(),
            sent_at,
        }
    }

    /// One-line summary
    pub fn subject(&self) -> String {
        match self.kind {
            NoticeKind::Alert => {
                let labels: Vec<&str> = self.reasons.iter().map(|r| r.label()).collect();
                format!("Pipeline degraded: {}", labels.join(", "))
            }
            NoticeKind::Recovery => "Pipeline recovered".to_string(),
        }
    }

    /// Sent-at time formatted for humans
    pub fn timestamp(&self) -> String {
        Utc.timestamp_opt(self.sent_at, 0)
            .single()
            .map(|t| t.format("%H:%M %d.%m.%Y UTC").to_string())
            .unwrap_or_else(|| self.sent_at.to_string())
    }
}

impl fmt::Display for SelfStateNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp(), self.subject())?;
        for reason in &self.reasons {
            write!(f, "\n  - {}", reason)?;
        }
        Ok(())
    }
}
