use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};

use leadsignal_store::Signal;

use crate::signal_types::{default_signal_type_table, is_alive, is_hard_kill, is_negative, SignalTypeProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDecision {
    AutoPush,
    NeedsReview,
    Hold,
    Reject,
}

impl fmt::Display for PushDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PushDecision::AutoPush => "auto_push",
            PushDecision::NeedsReview => "needs_review",
            PushDecision::Hold => "hold",
            PushDecision::Reject => "reject",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    SingleSource,
    MultiSource,
    Conflicting,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationStatus::SingleSource => "single_source",
            VerificationStatus::MultiSource => "multi_source",
            VerificationStatus::Conflicting => "conflicting",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct SignalDetail {
    pub signal_type: String,
    pub effect: String,
}

#[derive(Debug, Clone)]
pub struct ConfidenceBreakdown {
    pub base_score: f64,
    pub multi_source_boost: f64,
    pub convergence_boost: f64,
    pub founder_score: Option<f64>,
    pub founder_boost: f64,
    pub velocity_boost: f64,
    pub momentum_score: f64,
    pub signal_details: Vec<SignalDetail>,
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub decision: PushDecision,
    pub verification_status: VerificationStatus,
    pub confidence_score: f64,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub reason: String,
    pub suggested_crm_status: &'static str,
    pub signals_used: usize,
    pub sources_checked: usize,
    pub verification_details: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VerificationGateConfig {
    pub use_founder_scoring: bool,
    pub use_velocity_scoring: bool,
    pub strict_mode: bool,
    pub auto_push_threshold: f64,
    pub needs_review_threshold: f64,
}

impl Default for VerificationGateConfig {
    fn default() -> Self {
        Self {
            use_founder_scoring: false,
            use_velocity_scoring: false,
            strict_mode: false,
            auto_push_threshold: 0.70,
            needs_review_threshold: 0.40,
        }
    }
}

/// Weighted, time-decayed, multi-source scoring engine that turns a list of
/// signals for one canonical key into a push decision.
pub struct VerificationGate {
    config: VerificationGateConfig,
    signal_types: HashMap<&'static str, SignalTypeProfile>,
}

impl VerificationGate {
    pub fn new(config: VerificationGateConfig) -> Self {
        Self { config, signal_types: default_signal_type_table() }
    }

    pub fn evaluate(
        &self,
        signals: &[Signal],
        founder_score: Option<f64>,
        velocity_boost: Option<f64>,
        momentum_score: Option<f64>,
    ) -> VerificationResult {
        self.evaluate_at(signals, founder_score, velocity_boost, momentum_score, Utc::now())
    }

    pub fn evaluate_at(
        &self,
        signals: &[Signal],
        founder_score: Option<f64>,
        velocity_boost: Option<f64>,
        momentum_score: Option<f64>,
        now: DateTime<Utc>,
    ) -> VerificationResult {
        let sources_checked: HashSet<&str> = signals.iter().map(|s| s.source_api.as_str()).collect();

        if let Some(killed) = signals.iter().find(|s| is_hard_kill(&s.signal_type)) {
            return VerificationResult {
                decision: PushDecision::Reject,
                verification_status: VerificationStatus::Conflicting,
                confidence_score: 0.0,
                confidence_breakdown: ConfidenceBreakdown {
                    base_score: 0.0,
                    multi_source_boost: 1.0,
                    convergence_boost: 1.0,
                    founder_score: None,
                    founder_boost: 0.0,
                    velocity_boost: 0.0,
                    momentum_score: 0.0,
                    signal_details: vec![SignalDetail {
                        signal_type: killed.signal_type.clone(),
                        effect: "hard_kill".to_string(),
                    }],
                },
                reason: format!("hard kill: {} signal present", killed.signal_type),
                suggested_crm_status: "none",
                signals_used: signals.len(),
                sources_checked: sources_checked.len(),
                verification_details: vec![format!("{} triggers an immediate reject", killed.signal_type)],
            };
        }

        let mut groups: HashMap<&str, Vec<&Signal>> = HashMap::new();
        for signal in signals {
            groups.entry(signal.signal_type.as_str()).or_default().push(signal);
        }

        let mut signal_details = Vec::new();
        let mut base_score = 0.0_f64;

        for (signal_type, group) in &groups {
            let most_recent = group.iter().max_by_key(|s| s.detected_at).unwrap();
            let age_days = (now - most_recent.detected_at).num_seconds() as f64 / 86_400.0;
            let profile = self.signal_types.get(signal_type).copied().unwrap_or_else(|| {
                tracing::warn!(signal_type, "no weight profile configured, using default");
                SignalTypeProfile { weight: 0.05, half_life_days: 30.0 }
            });
            let decay = (-std::f64::consts::LN_2 * age_days / profile.half_life_days).exp();
            let contribution = most_recent.confidence * profile.weight * decay;
            base_score += contribution;
            signal_details.push(SignalDetail { signal_type: signal_type.to_string(), effect: "base".to_string() });
        }
        base_score = base_score.min(1.0);

        let multi_source_boost = if sources_checked.len() >= 2 {
            (1.0 + 0.1 * (sources_checked.len() - 1) as f64).min(1.2)
        } else {
            1.0
        };

        let convergence_boost = if groups.len() >= 3 { (1.0 + 0.08 * (groups.len() - 2) as f64).min(1.25) } else { 1.0 };

        let mut score = base_score * multi_source_boost * convergence_boost;

        let founder_boost = if self.config.use_founder_scoring {
            founder_score.map(|f| f.clamp(0.0, 1.0) * 0.15).unwrap_or(0.0).min(0.15)
        } else {
            0.0
        };
        if founder_boost > 0.0 {
            score += founder_boost;
            signal_details.push(SignalDetail { signal_type: "founder_score".to_string(), effect: "boost".to_string() });
        }

        let velocity_boost_applied = if self.config.use_velocity_scoring {
            velocity_boost.unwrap_or(0.0).min(0.20)
        } else {
            0.0
        };
        if velocity_boost_applied > 0.0 {
            score += velocity_boost_applied;
            signal_details
                .push(SignalDetail { signal_type: "velocity_momentum".to_string(), effect: "boost".to_string() });
        }

        let confidence_score = score.clamp(0.0, 1.0);

        let conflicting = groups.keys().any(|t| is_alive(t))
            && groups.keys().any(|t| is_negative(t) && !is_hard_kill(t));

        let verification_status = if conflicting {
            VerificationStatus::Conflicting
        } else if sources_checked.len() >= 2 {
            VerificationStatus::MultiSource
        } else {
            VerificationStatus::SingleSource
        };

        let (decision, suggested_crm_status, reason) = if conflicting {
            (
                PushDecision::NeedsReview,
                "Tracking",
                "conflicting alive and negative signals for the same company".to_string(),
            )
        } else if confidence_score >= self.config.auto_push_threshold {
            if self.config.strict_mode && sources_checked.len() < 2 {
                (
                    PushDecision::NeedsReview,
                    "Tracking",
                    "high confidence but strict mode requires 2+ sources".to_string(),
                )
            } else {
                (PushDecision::AutoPush, "Source", format!("confidence {confidence_score:.2} clears auto-push bar"))
            }
        } else if confidence_score >= self.config.needs_review_threshold {
            (PushDecision::NeedsReview, "Tracking", format!("confidence {confidence_score:.2} warrants review"))
        } else if self.config.strict_mode && sources_checked.is_empty() {
            (PushDecision::Reject, "none", "strict mode: no sources".to_string())
        } else {
            (PushDecision::Hold, "none", format!("confidence {confidence_score:.2} below review bar"))
        };

        VerificationResult {
            decision,
            verification_status,
            confidence_score,
            confidence_breakdown: ConfidenceBreakdown {
                base_score,
                multi_source_boost,
                convergence_boost,
                founder_score,
                founder_boost,
                velocity_boost: velocity_boost_applied,
                momentum_score: momentum_score.unwrap_or(0.0),
                signal_details,
            },
            reason,
            suggested_crm_status,
            signals_used: signals.len(),
            sources_checked: sources_checked.len(),
            verification_details: groups.keys().map(|t| format!("{t} contributed")).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsignal_store::ProcessingStatus;
    use serde_json::json;

    fn signal(signal_type: &str, source_api: &str, confidence: f64, age_days: i64) -> Signal {
        Signal {
            id: 1,
            signal_type: signal_type.to_string(),
            source_api: source_api.to_string(),
            canonical_key: "domain:acme.ai".to_string(),
            confidence,
            raw_data: json!({}),
            company_name: None,
            detected_at: Utc::now() - chrono::Duration::days(age_days),
            created_at: Utc::now(),
            processing_status: ProcessingStatus::Pending,
            crm_page_id: None,
            error_message: None,
        }
    }

    #[test]
    fn hard_kill_always_rejects() {
        let gate = VerificationGate::new(VerificationGateConfig {
            use_founder_scoring: true,
            use_velocity_scoring: true,
            ..Default::default()
        });
        let signals = vec![signal("github_spike", "github", 0.9, 1), signal("company_dissolved", "companies_house", 1.0, 0)];
        let result = gate.evaluate(&signals, Some(1.0), Some(0.35), Some(1.0));
        assert_eq!(result.decision, PushDecision::Reject);
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn founder_score_increases_confidence() {
        let gate = VerificationGate::new(VerificationGateConfig { use_founder_scoring: true, ..Default::default() });
        let signals = vec![signal("github_spike", "github", 0.6, 2)];
        let without = gate.evaluate(&signals, None, None, None);
        let with = gate.evaluate(&signals, Some(0.8), None, None);
        assert!(with.confidence_score > without.confidence_score);
    }

    #[test]
    fn founder_boost_is_capped_at_point_fifteen() {
        let gate = VerificationGate::new(VerificationGateConfig { use_founder_scoring: true, ..Default::default() });
        let signals = vec![signal("github_spike", "github", 0.5, 2)];
        let result = gate.evaluate(&signals, Some(1.0), None, None);
        assert!(result.confidence_breakdown.founder_boost <= 0.15);
    }

    #[test]
    fn founder_scoring_disabled_zeroes_boost() {
        let gate = VerificationGate::new(VerificationGateConfig::default());
        let signals = vec![signal("github_spike", "github", 0.6, 2)];
        let result = gate.evaluate(&signals, Some(0.9), None, None);
        assert_eq!(result.confidence_breakdown.founder_boost, 0.0);
    }

    #[test]
    fn velocity_boost_is_capped_at_point_two() {
        let gate = VerificationGate::new(VerificationGateConfig { use_velocity_scoring: true, ..Default::default() });
        let signals = vec![signal("github_spike", "github", 0.5, 1)];
        let result = gate.evaluate(&signals, None, Some(0.5), Some(1.0));
        assert!(result.confidence_breakdown.velocity_boost <= 0.20);
    }

    #[test]
    fn combined_boosts_cannot_exceed_one() {
        let gate = VerificationGate::new(VerificationGateConfig {
            use_founder_scoring: true,
            use_velocity_scoring: true,
            ..Default::default()
        });
        let signals = vec![
            signal("incorporation", "companies_house", 0.95, 5),
            signal("github_spike", "github", 0.9, 3),
            signal("hiring_signal", "job_postings", 0.9, 1),
        ];
        let result = gate.evaluate(&signals, Some(1.0), Some(0.35), Some(1.0));
        assert!(result.confidence_score <= 1.0);
    }

    #[test]
    fn breakdown_includes_founder_and_velocity_signal_details() {
        let gate = VerificationGate::new(VerificationGateConfig {
            use_founder_scoring: true,
            use_velocity_scoring: true,
            ..Default::default()
        });
        let signals = vec![signal("github_spike", "github", 0.7, 3)];
        let result = gate.evaluate(&signals, Some(0.7), Some(0.15), Some(0.6));
        let founder_entries = result.confidence_breakdown.signal_details.iter().filter(|d| d.signal_type == "founder_score").count();
        let velocity_entries =
            result.confidence_breakdown.signal_details.iter().filter(|d| d.signal_type == "velocity_momentum").count();
        assert_eq!(founder_entries, 1);
        assert_eq!(velocity_entries, 1);
    }

    #[test]
    fn conflicting_alive_and_negative_signals_force_needs_review() {
        let gate = VerificationGate::new(VerificationGateConfig::default());
        let signals = vec![signal("hiring_signal", "job_postings", 0.9, 1), signal("layoffs_detected", "job_postings", 0.9, 1)];
        let result = gate.evaluate(&signals, None, None, None);
        assert_eq!(result.decision, PushDecision::NeedsReview);
        assert_eq!(result.verification_status, VerificationStatus::Conflicting);
    }

    #[test]
    fn strict_mode_downgrades_single_source_auto_push() {
        let strict = VerificationGate::new(VerificationGateConfig { strict_mode: true, ..Default::default() });
        let signals = vec![signal("incorporation", "companies_house", 0.99, 1)];
        let result = strict.evaluate(&signals, None, None, None);
        if result.confidence_score >= 0.70 {
            assert_eq!(result.decision, PushDecision::NeedsReview);
        }
    }

    #[test]
    fn low_confidence_single_signal_holds() {
        let gate = VerificationGate::new(VerificationGateConfig::default());
        let signals = vec![signal("new_repo", "github", 0.3, 20)];
        let result = gate.evaluate(&signals, None, None, None);
        assert_eq!(result.decision, PushDecision::Hold);
    }
}
