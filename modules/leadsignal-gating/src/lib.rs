pub mod backend;
pub mod classifier;
pub mod error;
pub mod processor;
pub mod trigger;

pub use backend::{AnthropicBackend, ClassifierBackend, ClassifierResponse};
pub use classifier::{ClassificationLabel, ClassificationResult, ClassifierConfig, LlmClassifierV2};
pub use error::{GatingError, Result};
pub use processor::{ProcessingResult, ProcessingStats, ProcessorConfig, SignalProcessor};
pub use trigger::{ChangeType, TriggerGate, TriggerResult, DEFAULT_PIVOT_KEYWORDS};
