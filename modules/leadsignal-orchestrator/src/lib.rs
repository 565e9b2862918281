pub mod error;
pub mod health;
pub mod pipeline;

pub use error::{OrchestratorError, Result};
pub use health::{Anomaly, AnomalyKind, HealthMonitorConfig, HealthReport, SignalHealthMonitor, SourceHealth};
pub use pipeline::{
    regroup_by_resolved_links, run_full_pipeline, run_founder_sync, run_health_scan, run_outbox_drain, run_suppression_sync,
    PipelineConfig, PipelineDeps, PipelineStats,
};
