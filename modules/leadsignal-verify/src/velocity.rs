use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use leadsignal_store::Signal;

/// Computed (never persisted) view over recent signals for one canonical
/// key, feeding the `velocity_boost`/`momentum_score` inputs to the
/// verification gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocitySample {
    /// Sum of independently-triggerable contributions; callers pass this
    /// straight into the gate, which applies its own 0.20 cap.
    pub velocity_boost: f64,
    /// Descriptive only — not itself part of the additive scoring formula.
    pub momentum_score: f64,
}

/// Tracks convergence (distinct signal types arriving close together) and
/// momentum (an accelerating arrival rate) for one canonical key's signals.
pub fn compute_velocity(signals: &[Signal], now: DateTime<Utc>) -> VelocitySample {
    let mut boost = 0.0;

    let within_48h: HashSet<&str> = signals
        .iter()
        .filter(|s| now - s.detected_at <= Duration::hours(48))
        .map(|s| s.signal_type.as_str())
        .collect();
    if within_48h.len() >= 2 {
        boost += 0.10;
    }

    let within_7d: HashSet<&str> = signals
        .iter()
        .filter(|s| now - s.detected_at <= Duration::days(7))
        .map(|s| s.signal_type.as_str())
        .collect();
    if within_7d.len() >= 3 {
        boost += 0.15;
    }

    let momentum_score = if signals.len() >= 3 {
        let mut sorted: Vec<&Signal> = signals.iter().collect();
        sorted.sort_by_key(|s| s.detected_at);
        let n = sorted.len();
        let recent_gap = sorted[n - 1].detected_at - sorted[n - 2].detected_at;
        let preceding_gap = sorted[n - 2].detected_at - sorted[n - 3].detected_at;

        if recent_gap < preceding_gap && preceding_gap > Duration::zero() {
            boost += 0.05;
            let ratio = recent_gap.num_seconds() as f64 / preceding_gap.num_seconds() as f64;
            (1.0 - ratio).clamp(0.0, 1.0)
        } else {
            0.0
        }
    } else {
        0.0
    };

    VelocitySample { velocity_boost: boost, momentum_score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsignal_store::ProcessingStatus;
    use serde_json::json;

    fn signal(signal_type: &str, age: Duration) -> Signal {
        Signal {
            id: 1,
            signal_type: signal_type.to_string(),
            source_api: "github".to_string(),
            canonical_key: "domain:acme.ai".to_string(),
            confidence: 0.7,
            raw_data: json!({}),
            company_name: None,
            detected_at: Utc::now() - age,
            created_at: Utc::now() - age,
            processing_status: ProcessingStatus::Pending,
            crm_page_id: None,
            error_message: None,
        }
    }

    #[test]
    fn two_types_within_48h_add_convergence_boost() {
        let now = Utc::now();
        let signals = vec![signal("github_spike", Duration::hours(10)), signal("hiring_signal", Duration::hours(20))];
        let sample = compute_velocity(&signals, now);
        assert!((sample.velocity_boost - 0.10).abs() < 1e-9);
    }

    #[test]
    fn three_types_within_week_add_larger_boost() {
        let now = Utc::now();
        let signals = vec![
            signal("github_spike", Duration::days(1)),
            signal("hiring_signal", Duration::days(3)),
            signal("domain_registration", Duration::days(6)),
        ];
        let sample = compute_velocity(&signals, now);
        assert!((sample.velocity_boost - 0.15).abs() < 1e-9);
    }

    #[test]
    fn single_signal_has_no_boost_or_momentum() {
        let now = Utc::now();
        let sample = compute_velocity(&[signal("github_spike", Duration::hours(1))], now);
        assert_eq!(sample.velocity_boost, 0.0);
        assert_eq!(sample.momentum_score, 0.0);
    }

    #[test]
    fn accelerating_gaps_add_momentum_boost() {
        let now = Utc::now();
        let signals = vec![
            signal("github_spike", Duration::days(10)),
            signal("hiring_signal", Duration::days(4)),
            signal("domain_registration", Duration::hours(6)),
        ];
        let sample = compute_velocity(&signals, now);
        assert!(sample.momentum_score > 0.0);
    }
}
