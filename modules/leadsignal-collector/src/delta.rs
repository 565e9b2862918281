//! Snapshot delta utilities shared by adapters that watch a numeric metric
//! (star counts, upvotes, employee counts) for a fractional change.

use serde_json::Value as Json;

use leadsignal_store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    New,
    Changed,
    Unchanged,
}

/// Compare a freshly fetched value against the previous snapshot's value.
/// `None` previous means there is no prior snapshot (`New`). Otherwise
/// `Changed` when the fractional delta `(current - previous) / previous`
/// meets or exceeds `threshold`.
pub fn classify_delta(previous: Option<f64>, current: f64, threshold: f64) -> DeltaKind {
    let Some(previous) = previous else {
        return DeltaKind::New;
    };
    if previous <= 0.0 {
        return if current > previous { DeltaKind::Changed } else { DeltaKind::Unchanged };
    }
    let fractional_delta = (current - previous) / previous;
    if fractional_delta >= threshold {
        DeltaKind::Changed
    } else {
        DeltaKind::Unchanged
    }
}

/// Top-level field names whose value differs between two snapshot payloads.
/// Fields present in only one side count as changed. Order is not significant
/// to callers, so the scan order of `current`'s keys is used as-is.
fn diff_fields(previous: &Json, current: &Json) -> Vec<String> {
    let (Some(previous), Some(current)) = (previous.as_object(), current.as_object()) else {
        return Vec::new();
    };
    let mut changes: Vec<String> = Vec::new();
    for (key, value) in current {
        if previous.get(key) != Some(value) {
            changes.push(key.clone());
        }
    }
    for key in previous.keys() {
        if !current.contains_key(key) && !changes.contains(key) {
            changes.push(key.clone());
        }
    }
    changes
}

/// Persist a fetched payload as the latest snapshot for `(source_type,
/// external_id)` and report whether it is the asset's first snapshot along
/// with the top-level fields that changed since the previous one.
pub async fn save_snapshot(
    store: &Store,
    source_type: &str,
    external_id: &str,
    data: &Json,
) -> Result<(bool, Vec<String>), StoreError> {
    let previous = store.get_latest_snapshot(source_type, external_id).await?;
    let (is_new, changes) = match &previous {
        None => (true, Vec::new()),
        Some(snapshot) => {
            let changes = diff_fields(&snapshot.raw_payload, data);
            (false, changes)
        }
    };
    store
        .save_asset(source_type, external_id, data, !changes.is_empty() || is_new)
        .await?;
    Ok((is_new, changes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_previous_snapshot_is_new() {
        assert_eq!(classify_delta(None, 100.0, 0.2), DeltaKind::New);
    }

    #[test]
    fn crossing_threshold_is_changed() {
        assert_eq!(classify_delta(Some(100.0), 121.0, 0.2), DeltaKind::Changed);
        assert_eq!(classify_delta(Some(100.0), 110.0, 0.2), DeltaKind::Unchanged);
    }

    #[test]
    fn diff_fields_reports_changed_and_added_and_removed_keys() {
        let previous = serde_json::json!({"stars": 10, "name": "acme", "archived": false});
        let current = serde_json::json!({"stars": 42, "name": "acme", "topic": "ai"});
        let mut changes = diff_fields(&previous, &current);
        changes.sort();
        assert_eq!(changes, vec!["archived", "stars", "topic"]);
    }

    #[test]
    fn diff_fields_is_empty_when_unchanged() {
        let snapshot = serde_json::json!({"stars": 10, "name": "acme"});
        assert!(diff_fields(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn zero_previous_with_growth_is_changed() {
        assert_eq!(classify_delta(Some(0.0), 1.0, 0.2), DeltaKind::Changed);
        assert_eq!(classify_delta(Some(0.0), 0.0, 0.2), DeltaKind::Unchanged);
    }
}
