use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use leadsignal_store::Store;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SourceHealth {
    pub source_api: String,
    pub signal_count: i64,
    pub most_recent: Option<DateTime<Utc>>,
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    VolumeSpike,
    VolumeDrop,
    Stale,
}

#[derive(Debug, Clone)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub source_api: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub generated_at: DateTime<Utc>,
    pub total_pending: i64,
    pub sources: Vec<SourceHealth>,
    pub anomalies: Vec<Anomaly>,
}

pub struct HealthMonitorConfig {
    /// A source with no signal in this window is flagged stale.
    pub staleness_hours: i64,
    /// Sample size drawn from pending signals to build the per-source view.
    /// Health is advisory, so a bounded sample is acceptable; this is not
    /// an exhaustive count.
    pub sample_limit: i64,
    /// A source contributing more than this fraction of the sample is
    /// flagged as a possible volume spike (bot activity, API misbehavior).
    pub spike_share: f64,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self { staleness_hours: 48, sample_limit: 500, spike_share: 0.6 }
    }
}

/// Tracks signal volume by source, freshness, and lopsided contribution
/// patterns. Failures here are always advisory: the pipeline logs and
/// continues regardless of what this produces.
pub struct SignalHealthMonitor {
    store: Arc<Store>,
    config: HealthMonitorConfig,
}

impl SignalHealthMonitor {
    pub fn new(store: Arc<Store>, config: HealthMonitorConfig) -> Self {
        Self { store, config }
    }

    pub async fn generate_report(&self) -> Result<HealthReport> {
        let now = Utc::now();
        let signals = self.store.get_pending_signals(Some(self.config.sample_limit), None).await?;
        let total_pending = signals.len() as i64;

        let mut by_source: HashMap<String, (i64, Option<DateTime<Utc>>)> = HashMap::new();
        for signal in &signals {
            let entry = by_source.entry(signal.source_api.clone()).or_insert((0, None));
            entry.0 += 1;
            entry.1 = match entry.1 {
                Some(current) if current >= signal.detected_at => Some(current),
                _ => Some(signal.detected_at),
            };
        }

        let mut sources = Vec::new();
        let mut anomalies = Vec::new();

        for (source_api, (count, most_recent)) in &by_source {
            let stale = most_recent.map(|t| now - t > Duration::hours(self.config.staleness_hours)).unwrap_or(true);
            if stale {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::Stale,
                    source_api: source_api.clone(),
                    message: format!("no signal from {source_api} in the last {} hours", self.config.staleness_hours),
                });
            }

            if total_pending > 0 && (*count as f64 / total_pending as f64) > self.config.spike_share {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::VolumeSpike,
                    source_api: source_api.clone(),
                    message: format!("{source_api} contributes {count}/{total_pending} pending signals"),
                });
            }

            sources.push(SourceHealth { source_api: source_api.clone(), signal_count: *count, most_recent: *most_recent, stale });
        }

        if total_pending == 0 {
            anomalies.push(Anomaly {
                kind: AnomalyKind::VolumeDrop,
                source_api: "*".to_string(),
                message: "no pending signals from any source".to_string(),
            });
        }

        sources.sort_by(|a, b| b.signal_count.cmp(&a.signal_count));

        Ok(HealthReport { generated_at: now, total_pending, sources, anomalies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_flags_after_two_days() {
        let config = HealthMonitorConfig::default();
        assert_eq!(config.staleness_hours, 48);
    }
}
