use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::classifier::{ClassificationLabel, ClassificationResult, ClassifierConfig, LlmClassifierV2};
use crate::trigger::{TriggerGate, TriggerResult};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub description_threshold: f64,
    pub pivot_keywords: Option<Vec<String>>,
    pub classifier: ClassifierConfig,
    pub dry_run: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            description_threshold: 0.2,
            pivot_keywords: None,
            classifier: ClassifierConfig::default(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub signal_id: String,
    pub triggered: bool,
    pub gating_skipped: bool,
    pub skip_reason: Option<String>,
    pub trigger_result: Option<TriggerResult>,
    pub classification: Option<ClassificationResult>,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingResult {
    /// True if this signal warrants action (pivot or expansion).
    pub fn is_actionable(&self) -> bool {
        matches!(
            self.classification.as_ref().map(|c| c.label),
            Some(ClassificationLabel::Pivot) | Some(ClassificationLabel::Expansion)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub total: u64,
    pub triggered: u64,
    pub not_triggered: u64,
    pub skipped: u64,
    pub llm_calls: u64,
    pub cached_classifications: u64,
    pub errors: u64,

    pub pivots: u64,
    pub expansions: u64,
    pub rebrands: u64,
    pub minors: u64,
    pub needs_review: u64,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingStats {
    pub fn duration_seconds(&self) -> f64 {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }

    /// Percentage of eligible (non-skipped) signals that triggered classification.
    pub fn trigger_rate(&self) -> f64 {
        let eligible = self.total.saturating_sub(self.skipped);
        if eligible == 0 {
            0.0
        } else {
            self.triggered as f64 / eligible as f64
        }
    }

    pub fn cache_hit_rate(&self) -> f64 {
        if self.triggered == 0 {
            0.0
        } else {
            self.cached_classifications as f64 / self.triggered as f64
        }
    }
}

/// Orchestrates the two-stage gating pipeline: `TriggerGate` first, then
/// `LlmClassifierV2` only for signals the gate flags.
pub struct SignalProcessor {
    config: ProcessorConfig,
    trigger_gate: TriggerGate,
    classifier: LlmClassifierV2,
}

impl SignalProcessor {
    pub fn new(config: ProcessorConfig, classifier: LlmClassifierV2) -> Self {
        let trigger_gate = TriggerGate::new(config.description_threshold, config.pivot_keywords.clone());
        Self { config, trigger_gate, classifier }
    }

    /// `raw_data` must carry the previous snapshot under `previous_snapshot`;
    /// every other key is treated as the current snapshot.
    pub async fn process_signal(&mut self, signal_id: &str, raw_data: &Json) -> ProcessingResult {
        let now = Utc::now();
        let previous_snapshot = raw_data.get("previous_snapshot");

        let Some(previous_snapshot) = previous_snapshot.filter(|v| !v.is_null()) else {
            tracing::debug!(signal_id, "no previous snapshot, skipping gating");
            return ProcessingResult {
                signal_id: signal_id.to_string(),
                triggered: false,
                gating_skipped: true,
                skip_reason: Some("no_previous_snapshot".to_string()),
                trigger_result: None,
                classification: None,
                processed_at: now,
            };
        };

        let current_snapshot = strip_previous_snapshot(raw_data);
        let trigger_result = self.trigger_gate.should_classify(previous_snapshot, &current_snapshot);

        if !trigger_result.should_trigger {
            tracing::debug!(signal_id, "not triggered by gate");
            return ProcessingResult {
                signal_id: signal_id.to_string(),
                triggered: false,
                gating_skipped: false,
                skip_reason: None,
                trigger_result: Some(trigger_result),
                classification: None,
                processed_at: now,
            };
        }

        tracing::info!(signal_id, reason = ?trigger_result.trigger_reason, "signal triggered classification");

        if self.config.dry_run {
            return ProcessingResult {
                signal_id: signal_id.to_string(),
                triggered: true,
                gating_skipped: false,
                skip_reason: None,
                trigger_result: Some(trigger_result),
                classification: None,
                processed_at: now,
            };
        }

        let old_desc = previous_snapshot.get("description").and_then(Json::as_str).unwrap_or("");
        let new_desc = current_snapshot.get("description").and_then(Json::as_str).unwrap_or("");

        let classification = self.classifier.classify(old_desc, new_desc).await;
        tracing::info!(
            signal_id,
            label = %classification.label,
            confidence = classification.confidence,
            "signal classified"
        );

        ProcessingResult {
            signal_id: signal_id.to_string(),
            triggered: true,
            gating_skipped: false,
            skip_reason: None,
            trigger_result: Some(trigger_result),
            classification: Some(classification),
            processed_at: now,
        }
    }

    pub async fn process_batch(&mut self, signals: &[(String, Json)]) -> ProcessingStats {
        let mut stats = ProcessingStats { total: signals.len() as u64, started_at: Some(Utc::now()), ..Default::default() };

        for (signal_id, raw_data) in signals {
            let result = self.process_signal(signal_id, raw_data).await;

            if result.gating_skipped {
                stats.skipped += 1;
                continue;
            }

            if !result.triggered {
                stats.not_triggered += 1;
                continue;
            }

            stats.triggered += 1;

            let Some(classification) = result.classification else {
                continue;
            };

            if classification.cached {
                stats.cached_classifications += 1;
            } else {
                stats.llm_calls += 1;
            }

            match classification.label {
                ClassificationLabel::Pivot => stats.pivots += 1,
                ClassificationLabel::Expansion => stats.expansions += 1,
                ClassificationLabel::Rebrand => stats.rebrands += 1,
                ClassificationLabel::Minor => stats.minors += 1,
                ClassificationLabel::NeedsReview => stats.needs_review += 1,
            }
        }

        stats.completed_at = Some(Utc::now());
        stats
    }
}

fn strip_previous_snapshot(raw_data: &Json) -> Json {
    match raw_data {
        Json::Object(map) => {
            let mut cleaned = map.clone();
            cleaned.remove("previous_snapshot");
            Json::Object(cleaned)
        }
        other => other.clone(),
    }
}
