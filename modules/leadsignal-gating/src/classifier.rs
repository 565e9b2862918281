use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::backend::ClassifierBackend;

pub const SCHEMA_VERSION: &str = "v1";

const PROMPT_TEMPLATE: &str = "Analyze the change between old and new company descriptions.\n\n\
Old: {old_description}\n\
New: {new_description}\n\n\
Classify this change as ONE of:\n\
- pivot: Fundamental business model change (B2C->B2B, consumer->enterprise, completely different market)\n\
- expansion: Adding new product line or market segment while keeping core business\n\
- rebrand: Name/identity change without business model shift\n\
- minor: Cosmetic changes, typo fixes, small updates, wording improvements\n\
- needs_review: Unclear, ambiguous, or requires human review\n\n\
Respond with ONLY valid JSON (no markdown, no code blocks):\n\
{{\"schema_version\": \"v1\", \"label\": \"<label>\", \"confidence\": <0.0-1.0>, \"rationale\": \"<brief 1-2 sentence explanation>\"}}\n";

const SYSTEM_PROMPT: &str = "You classify changes between two snapshots of a company's public description. \
Respond only with the requested JSON object.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    Pivot,
    Expansion,
    Rebrand,
    Minor,
    NeedsReview,
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassificationLabel::Pivot => "pivot",
            ClassificationLabel::Expansion => "expansion",
            ClassificationLabel::Rebrand => "rebrand",
            ClassificationLabel::Minor => "minor",
            ClassificationLabel::NeedsReview => "needs_review",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ClassificationLabel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pivot" => Ok(Self::Pivot),
            "expansion" => Ok(Self::Expansion),
            "rebrand" => Ok(Self::Rebrand),
            "minor" => Ok(Self::Minor),
            "needs_review" => Ok(Self::NeedsReview),
            other => Err(format!("unknown classification label: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model: String,
    pub min_confidence: f64,
    pub cache_enabled: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: "claude-haiku-4-5-20251001".to_string(),
            min_confidence: 0.7,
            cache_enabled: true,
            temperature: 0.2,
            max_tokens: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub schema_version: String,
    pub label: ClassificationLabel,
    pub confidence: f64,
    pub rationale: String,
    pub input_hash: String,
    #[serde(default)]
    pub cached: bool,
}

/// Stage 2 of the gating pipeline: a strict-contract, cached LLM classifier
/// for the *nature* of a snapshot change (pivot / expansion / rebrand / minor).
pub struct LlmClassifierV2 {
    config: ClassifierConfig,
    backend: Box<dyn ClassifierBackend>,
    cache: HashMap<String, ClassificationResult>,
}

impl LlmClassifierV2 {
    pub fn new(config: ClassifierConfig, backend: Box<dyn ClassifierBackend>) -> Self {
        Self { config, backend, cache: HashMap::new() }
    }

    pub fn input_hash(old_description: &str, new_description: &str) -> String {
        let content = format!("{old_description}|||{new_description}");
        let digest = Sha256::digest(content.as_bytes());
        let full_hex = format!("{digest:x}");
        format!("sha256:{}", &full_hex[..16])
    }

    pub async fn classify(&mut self, old_description: &str, new_description: &str) -> ClassificationResult {
        let input_hash = Self::input_hash(old_description, new_description);

        if self.config.cache_enabled {
            if let Some(cached) = self.cache.get(&input_hash) {
                let mut result = cached.clone();
                result.cached = true;
                return result;
            }
        }

        let prompt = PROMPT_TEMPLATE
            .replace("{old_description}", if old_description.is_empty() { "(empty)" } else { old_description })
            .replace("{new_description}", if new_description.is_empty() { "(empty)" } else { new_description });

        let parsed = match self
            .backend
            .extract_classification(SYSTEM_PROMPT, &prompt, self.config.temperature, self.config.max_tokens)
            .await
        {
            Ok(response) => {
                let label = response.label.parse().unwrap_or(ClassificationLabel::NeedsReview);
                ClassificationResult {
                    schema_version: response.schema_version,
                    label,
                    confidence: response.confidence,
                    rationale: response.rationale,
                    input_hash: input_hash.clone(),
                    cached: false,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "classifier backend call failed");
                ClassificationResult {
                    schema_version: SCHEMA_VERSION.to_string(),
                    label: ClassificationLabel::NeedsReview,
                    confidence: 0.0,
                    rationale: format!("backend error: {err}"),
                    input_hash: input_hash.clone(),
                    cached: false,
                }
            }
        };

        let result = if parsed.confidence < self.config.min_confidence {
            ClassificationResult {
                schema_version: parsed.schema_version,
                label: ClassificationLabel::NeedsReview,
                confidence: parsed.confidence,
                rationale: format!("Low confidence ({:.2}): {}", parsed.confidence, parsed.rationale),
                input_hash: input_hash.clone(),
                cached: false,
            }
        } else {
            parsed
        };

        if self.config.cache_enabled {
            self.cache.insert(input_hash, result.clone());
        }

        result
    }

    pub fn save_cache(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.cache)?;
        std::fs::write(path, json)
    }

    pub fn load_cache(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };
        let loaded: HashMap<String, ClassificationResult> = serde_json::from_str(&data)?;
        self.cache.extend(loaded);
        Ok(())
    }

    pub fn clear_cache(&mut self) -> usize {
        let count = self.cache.len();
        self.cache.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::backend::ClassifierResponse;

    struct StubBackend {
        calls: Arc<AtomicUsize>,
        response: ClassifierResponse,
    }

    #[async_trait]
    impl ClassifierBackend for StubBackend {
        async fn extract_classification(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> anyhow::Result<ClassifierResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[test]
    fn input_hash_is_deterministic_and_prefixed() {
        let a = LlmClassifierV2::input_hash("old", "new");
        let b = LlmClassifierV2::input_hash("old", "new");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 16);
    }

    #[test]
    fn input_hash_differs_for_different_inputs() {
        let a = LlmClassifierV2::input_hash("old", "new");
        let b = LlmClassifierV2::input_hash("old", "different");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn high_confidence_result_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = StubBackend {
            calls: calls.clone(),
            response: ClassifierResponse {
                schema_version: "v1".to_string(),
                label: "pivot".to_string(),
                confidence: 0.9,
                rationale: "clear business model shift".to_string(),
            },
        };
        let mut classifier = LlmClassifierV2::new(ClassifierConfig::default(), Box::new(backend));
        let result = classifier.classify("consumer fitness app", "enterprise wellness platform").await;
        assert_eq!(result.label, ClassificationLabel::Pivot);
        assert!(!result.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn low_confidence_is_downgraded_to_needs_review() {
        let backend = StubBackend {
            calls: Arc::new(AtomicUsize::new(0)),
            response: ClassifierResponse {
                schema_version: "v1".to_string(),
                label: "expansion".to_string(),
                confidence: 0.3,
                rationale: "ambiguous".to_string(),
            },
        };
        let mut classifier = LlmClassifierV2::new(ClassifierConfig::default(), Box::new(backend));
        let result = classifier.classify("a", "b").await;
        assert_eq!(result.label, ClassificationLabel::NeedsReview);
        assert!(result.rationale.starts_with("Low confidence"));
    }

    #[tokio::test]
    async fn repeated_calls_hit_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = StubBackend {
            calls: calls.clone(),
            response: ClassifierResponse {
                schema_version: "v1".to_string(),
                label: "minor".to_string(),
                confidence: 0.95,
                rationale: "typo fix".to_string(),
            },
        };
        let mut classifier = LlmClassifierV2::new(ClassifierConfig::default(), Box::new(backend));
        let first = classifier.classify("old", "new").await;
        let second = classifier.classify("old", "new").await;
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unparseable_label_falls_back_to_needs_review() {
        let backend = StubBackend {
            calls: Arc::new(AtomicUsize::new(0)),
            response: ClassifierResponse {
                schema_version: "v1".to_string(),
                label: "not_a_real_label".to_string(),
                confidence: 0.95,
                rationale: "garbage".to_string(),
            },
        };
        let mut classifier = LlmClassifierV2::new(ClassifierConfig::default(), Box::new(backend));
        let result = classifier.classify("old", "new").await;
        assert_eq!(result.label, ClassificationLabel::NeedsReview);
    }
}
