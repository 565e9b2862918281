use std::fmt;

use serde_json::Value as Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    DescriptionChange,
    DomainChange,
    NameChange,
    KeywordSwap,
    NoChange,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::DescriptionChange => "description_change",
            ChangeType::DomainChange => "domain_change",
            ChangeType::NameChange => "name_change",
            ChangeType::KeywordSwap => "keyword_swap",
            ChangeType::NoChange => "no_change",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriggerResult {
    pub should_trigger: bool,
    pub change_types: Vec<ChangeType>,
    pub trigger_reason: Option<String>,
    pub change_magnitude: f64,
}

pub const DEFAULT_PIVOT_KEYWORDS: &[&str] = &[
    "enterprise",
    "b2b",
    "platform",
    "api",
    "saas",
    "pivot",
    "rebrand",
    "acquired",
    "shutdown",
    "deprecated",
    "discontinued",
    "sunsetting",
    "closed",
];

/// Deterministic, free first stage of the gating pipeline: decides whether a
/// snapshot diff is worth sending to the LLM classifier.
pub struct TriggerGate {
    description_threshold: f64,
    pivot_keywords: Vec<String>,
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new(0.2, None)
    }
}

impl TriggerGate {
    pub fn new(description_threshold: f64, pivot_keywords: Option<Vec<String>>) -> Self {
        Self {
            description_threshold,
            pivot_keywords: pivot_keywords
                .unwrap_or_else(|| DEFAULT_PIVOT_KEYWORDS.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn should_classify(&self, old_snapshot: &Json, new_snapshot: &Json) -> TriggerResult {
        if !is_populated(old_snapshot) {
            return TriggerResult {
                should_trigger: false,
                change_types: vec![ChangeType::NoChange],
                trigger_reason: Some("No baseline snapshot for comparison".to_string()),
                change_magnitude: 0.0,
            };
        }

        let mut change_types = Vec::new();
        let mut reasons = Vec::new();
        let mut max_magnitude = 0.0_f64;

        if let Some((change_type, reason, magnitude)) =
            self.check_description_change(old_snapshot, new_snapshot)
        {
            change_types.push(change_type);
            reasons.push(reason);
            max_magnitude = max_magnitude.max(magnitude);
        }

        if let Some((change_type, reason, magnitude)) = self.check_domain_change(old_snapshot, new_snapshot) {
            change_types.push(change_type);
            reasons.push(reason);
            max_magnitude = max_magnitude.max(magnitude);
        }

        if let Some((change_type, reason, magnitude)) =
            self.check_pivot_keywords(old_snapshot, new_snapshot)
        {
            change_types.push(change_type);
            reasons.push(reason);
            max_magnitude = max_magnitude.max(magnitude);
        }

        if change_types.is_empty() {
            return TriggerResult {
                should_trigger: false,
                change_types: vec![ChangeType::NoChange],
                trigger_reason: None,
                change_magnitude: 0.0,
            };
        }

        TriggerResult {
            should_trigger: true,
            change_types,
            trigger_reason: Some(reasons.join("; ")),
            change_magnitude: max_magnitude,
        }
    }

    fn check_description_change(&self, old: &Json, new: &Json) -> Option<(ChangeType, String, f64)> {
        let old_desc = get_str(old, "description")?;
        let new_desc = get_str(new, "description")?;
        if old_desc.is_empty() || new_desc.is_empty() {
            return None;
        }

        let ratio = strsim::normalized_levenshtein(old_desc, new_desc);
        let change_pct = 1.0 - ratio;

        if change_pct > self.description_threshold {
            return Some((
                ChangeType::DescriptionChange,
                format!("Description changed {:.0}%", change_pct * 100.0),
                change_pct,
            ));
        }
        None
    }

    fn check_domain_change(&self, old: &Json, new: &Json) -> Option<(ChangeType, String, f64)> {
        let old_domain = first_str(old, &["homepage", "domain", "website"])?;
        let new_domain = first_str(new, &["homepage", "domain", "website"])?;

        let old_normalized = normalize_domain(old_domain);
        let new_normalized = normalize_domain(new_domain);

        if old_normalized != new_normalized {
            return Some((
                ChangeType::DomainChange,
                format!("Domain changed: {old_domain} -> {new_domain}"),
                1.0,
            ));
        }
        None
    }

    fn check_pivot_keywords(&self, old: &Json, new: &Json) -> Option<(ChangeType, String, f64)> {
        let old_desc = get_str(old, "description").unwrap_or("").to_lowercase();
        let new_desc = get_str(new, "description").unwrap_or("").to_lowercase();
        if new_desc.is_empty() {
            return None;
        }

        let new_keywords: Vec<&str> = self
            .pivot_keywords
            .iter()
            .filter(|k| new_desc.contains(k.as_str()) && !old_desc.contains(k.as_str()))
            .map(|k| k.as_str())
            .collect();

        if new_keywords.is_empty() {
            return None;
        }

        Some((
            ChangeType::KeywordSwap,
            format!("Pivot keywords detected: {}", new_keywords.join(", ")),
            0.8,
        ))
    }
}

fn is_populated(snapshot: &Json) -> bool {
    match snapshot {
        Json::Object(map) => !map.is_empty(),
        Json::Null => false,
        _ => true,
    }
}

fn get_str<'a>(snapshot: &'a Json, field: &str) -> Option<&'a str> {
    snapshot.get(field).and_then(Json::as_str)
}

fn first_str<'a>(snapshot: &'a Json, fields: &[&str]) -> Option<&'a str> {
    fields.iter().find_map(|f| get_str(snapshot, f)).filter(|s| !s.is_empty())
}

fn normalize_domain(domain: &str) -> String {
    let mut d = domain.to_lowercase();
    d = d.trim().to_string();
    for prefix in ["https://", "http://", "www."] {
        if let Some(stripped) = d.strip_prefix(prefix) {
            d = stripped.to_string();
        }
    }
    d.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_baseline_never_triggers() {
        let gate = TriggerGate::default();
        let result = gate.should_classify(&json!({}), &json!({"description": "new thing"}));
        assert!(!result.should_trigger);
        assert_eq!(result.change_types, vec![ChangeType::NoChange]);
    }

    #[test]
    fn significant_description_change_triggers() {
        let gate = TriggerGate::default();
        let old = json!({"description": "A fitness tracking app for consumers"});
        let new = json!({"description": "Enterprise wellness analytics platform for HR teams"});
        let result = gate.should_classify(&old, &new);
        assert!(result.should_trigger);
        assert!(result.change_types.contains(&ChangeType::DescriptionChange));
    }

    #[test]
    fn domain_change_is_high_magnitude() {
        let gate = TriggerGate::default();
        let old = json!({"homepage": "https://www.old-site.com/"});
        let new = json!({"homepage": "https://new-site.com"});
        let result = gate.should_classify(&old, &new);
        assert!(result.should_trigger);
        assert!(result.change_types.contains(&ChangeType::DomainChange));
        assert_eq!(result.change_magnitude, 1.0);
    }

    #[test]
    fn identical_domains_do_not_trigger_domain_change() {
        let gate = TriggerGate::default();
        let old = json!({"homepage": "https://www.acme.com/"});
        let new = json!({"homepage": "acme.com"});
        let result = gate.should_classify(&old, &new);
        assert!(!result.change_types.contains(&ChangeType::DomainChange));
    }

    #[test]
    fn new_pivot_keyword_triggers_keyword_swap() {
        let gate = TriggerGate::default();
        let old = json!({"description": "A todo list app"});
        let new = json!({"description": "A todo list app, now with an enterprise API"});
        let result = gate.should_classify(&old, &new);
        assert!(result.change_types.contains(&ChangeType::KeywordSwap));
    }

    #[test]
    fn no_changes_does_not_trigger() {
        let gate = TriggerGate::default();
        let snapshot = json!({"description": "Stable product", "homepage": "https://acme.com"});
        let result = gate.should_classify(&snapshot, &snapshot);
        assert!(!result.should_trigger);
    }
}
