pub mod connector;
pub mod error;
pub mod founder_sync;
pub mod outbox;
pub mod payload;
pub mod suppression;

pub use connector::{CrmConnector, NotionConnector};
pub use error::{CrmError, Result};
pub use founder_sync::{FounderSync, FounderSyncConfig, FounderSyncStats};
pub use outbox::{DrainStats, OutboxWorker, OutboxWorkerConfig};
pub use payload::{CrmRecord, InvestmentStage, ProspectPayload, UpsertResult, UpsertStatus};
pub use suppression::{SuppressionSync, SyncStats};
