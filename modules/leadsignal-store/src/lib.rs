pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::Store;
pub use types::{
    AssetToLead, FounderProfile, NewSignal, OutboxEntry, OutboxStatus, PipelineRun,
    ProcessingStatus, ResolvedBy, Signal, SourceAsset, StoreStats, SuppressionEntry,
    SuppressionStats,
};
