pub mod error;
pub mod founder;
pub mod gate;
pub mod signal_types;
pub mod velocity;

pub use error::{Result, VerifyError};
pub use founder::{founder_score, FounderScoringConfig};
pub use gate::{
    ConfidenceBreakdown, PushDecision, SignalDetail, VerificationGate, VerificationGateConfig, VerificationResult,
    VerificationStatus,
};
pub use signal_types::{default_signal_type_table, is_alive, is_hard_kill, is_negative, SignalTypeProfile};
pub use velocity::{compute_velocity, VelocitySample};
