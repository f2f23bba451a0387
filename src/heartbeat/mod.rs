//! Heartbeat probes
//!
//! Two independently scheduled probes observe the pipeline from inside the
//! ingestion process:
//!
//! - [`IngestionProbe`]: publishes an ingestion heartbeat when metrics arrive
//! - [`MatchedProbe`]: watches the matched-metrics rate and sets the shared
//!   health flag on anomalies or when the counter cannot be read

pub mod baseline;
pub mod detector;
pub mod ingestion;
pub mod matched;
pub mod metrics;

pub use baseline::{BaselineCache, BaselineEntry, BASELINE_TTL_FACTOR};
pub use detector::{MatchRateDetector, MatchVerdict};
pub use ingestion::{IngestionProbe, IngestionTick};
pub use matched::{MatchedProbe, MatchedTick, ProbeDegradation};
pub use metrics::{FilterMetrics, MetricsSource};
