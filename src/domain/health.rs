//! Health-related domain types
//!
//! Provides the authoritative health flag, the watched activity dimensions
//! and the breach reasons the monitor reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authoritative pipeline health flag
///
/// Exactly one instance lives in the shared store. A store that has never
/// been written reports `Healthy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Pipeline is working as expected
    #[default]
    Healthy,
    /// An anomaly was detected or the pipeline could not be observed
    Degraded,
}

impl HealthState {
    /// Storage representation of the state
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "OK",
            Self::Degraded => "ERROR",
        }
    }

    /// Whether this state should raise an alert
    #[inline]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}

impl FromStr for HealthState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" | "HEALTHY" => Ok(Self::Healthy),
            "ERROR" | "DEGRADED" => Ok(Self::Degraded),
            other => Err(format!("unknown health state: {}", other)),
        }
    }
}

/// Activity dimension whose last-activity timestamp lives in the shared store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Metrics received by the ingestion engine
    Ingestion,
    /// Triggers checked by the local checker
    Check,
    /// Triggers checked by the remote checker
    RemoteCheck,
}

impl Dimension {
    /// All dimensions, in reporting order
    pub const ALL: [Dimension; 3] = [Self::Ingestion, Self::Check, Self::RemoteCheck];

    /// Key under which the dimension's heartbeat is stored
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Ingestion => "heartbeat.ingestion",
            Self::Check => "heartbeat.check",
            Self::RemoteCheck => "heartbeat.remote_check",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingestion => write!(f, "ingestion"),
            Self::Check => write!(f, "check"),
            Self::RemoteCheck => write!(f, "remote_check"),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingestion" => Ok(Self::Ingestion),
            "check" => Ok(Self::Check),
            "remote_check" | "remote-check" => Ok(Self::RemoteCheck),
            other => Err(format!("unknown dimension: {}", other)),
        }
    }
}

/// Why the monitor considers the pipeline degraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BreachReason {
    /// No successful store read for longer than the disconnect delay
    StoreUnreachable { elapsed_secs: i64, limit_secs: i64 },
    /// No metrics received for longer than the allowed delay
    IngestionStalled { elapsed_secs: i64, limit_secs: i64 },
    /// Local checker has not checked triggers for longer than the allowed delay
    ChecksStalled { elapsed_secs: i64, limit_secs: i64 },
    /// Remote checker has not checked triggers for longer than the allowed delay
    RemoteChecksStalled { elapsed_secs: i64, limit_secs: i64 },
    /// A probe set the authoritative flag to degraded
    HealthDegraded,
}

impl BreachReason {
    /// Short stable label for the reason
    pub const fn label(&self) -> &'static str {
        match self {
            Self::StoreUnreachable { .. } => "store unreachable",
            Self::IngestionStalled { .. } => "ingestion stalled",
            Self::ChecksStalled { .. } => "checks stalled",
            Self::RemoteChecksStalled { .. } => "remote checks stalled",
            Self::HealthDegraded => "health degraded",
        }
    }
}

impl fmt::Display for BreachReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreUnreachable {
                elapsed_secs,
                limit_secs,
            } => write!(
                f,
                "{}: no successful store read for {}s (limit {}s)",
                self.label(),
                elapsed_secs,
                limit_secs
            ),
            Self::IngestionStalled {
                elapsed_secs,
                limit_secs,
            } => write!(
                f,
                "{}: no metrics received for {}s (limit {}s)",
                self.label(),
                elapsed_secs,
                limit_secs
            ),
            Self::ChecksStalled {
                elapsed_secs,
                limit_secs,
            } => write!(
                f,
                "{}: no triggers checked for {}s (limit {}s)",
                self.label(),
                elapsed_secs,
                limit_secs
            ),
            Self::RemoteChecksStalled {
                elapsed_secs,
                limit_secs,
            } => write!(
                f,
                "{}: no remote triggers checked for {}s (limit {}s)",
                self.label(),
                elapsed_secs,
                limit_secs
            ),
            Self::HealthDegraded => write!(
                f,
                "{}: notifications are not being sent (state {})",
                self.label(),
                HealthState::Degraded.as_str()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_state_default_is_healthy() {
        assert_eq!(HealthState::default(), HealthState::Healthy);
        assert!(!HealthState::default().is_degraded());
    }

    #[test]
    fn test_health_state_round_trips_storage_form() {
        for state in [HealthState::Healthy, HealthState::Degraded] {
            assert_eq!(state.as_str().parse::<HealthState>().unwrap(), state);
        }
        assert_eq!("degraded".parse::<HealthState>().unwrap(), HealthState::Degraded);
        assert!("maybe".parse::<HealthState>().is_err());
    }

    #[test]
    fn test_dimension_keys_are_distinct() {
        let keys: std::collections::HashSet<_> = Dimension::ALL.iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), Dimension::ALL.len());
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("remote-check".parse::<Dimension>().unwrap(), Dimension::RemoteCheck);
        assert!("filter".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_breach_reason_display() {
        let reason = BreachReason::IngestionStalled {
            elapsed_secs: 90,
            limit_secs: 60,
        };
        assert_eq!(reason.label(), "ingestion stalled");
        assert!(reason.to_string().starts_with("ingestion stalled"));
        assert!(reason.to_string().contains("90s"));
    }
}
