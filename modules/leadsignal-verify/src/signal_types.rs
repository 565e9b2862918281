use std::collections::HashMap;

/// Static weight and decay half-life for one `signal_type`, consulted by the
/// verification gate's per-type aggregation step.
#[derive(Debug, Clone, Copy)]
pub struct SignalTypeProfile {
    pub weight: f64,
    pub half_life_days: f64,
}

/// Signal types whose presence rejects a lead outright, bypassing scoring
/// entirely. No boost can override a hard kill.
pub const HARD_KILL_TYPES: &[&str] = &["company_dissolved"];

/// "Alive" types: evidence the company is active and growing.
pub const ALIVE_TYPES: &[&str] = &[
    "hiring_signal",
    "incorporation",
    "funding_round",
    "domain_registration",
    "patent_filed",
    "sec_filing",
    "github_spike",
    "commit_spike",
    "new_repo",
    "org_created",
    "product_hunt_launch",
    "hacker_news_launch",
];

/// "Negative" types that suggest the company is winding down. Includes the
/// hard-kill set; types here that are NOT hard-kill still contribute to the
/// base score but trigger `conflicting` status when seen alongside an alive
/// signal for the same canonical key.
pub const NEGATIVE_TYPES: &[&str] = &["company_dissolved", "layoffs_detected", "domain_expired"];

/// Documented default weight/half-life table. Hiring and funding-round
/// evidence decay slowly and carry the most weight; code-host activity is
/// noisy and decays fast.
pub fn default_signal_type_table() -> HashMap<&'static str, SignalTypeProfile> {
    [
        ("hiring_signal", SignalTypeProfile { weight: 0.30, half_life_days: 45.0 }),
        ("incorporation", SignalTypeProfile { weight: 0.35, half_life_days: 60.0 }),
        ("funding_round", SignalTypeProfile { weight: 0.40, half_life_days: 90.0 }),
        ("domain_registration", SignalTypeProfile { weight: 0.20, half_life_days: 30.0 }),
        ("patent_filed", SignalTypeProfile { weight: 0.25, half_life_days: 120.0 }),
        ("sec_filing", SignalTypeProfile { weight: 0.30, half_life_days: 90.0 }),
        ("github_spike", SignalTypeProfile { weight: 0.15, half_life_days: 14.0 }),
        ("commit_spike", SignalTypeProfile { weight: 0.12, half_life_days: 14.0 }),
        ("new_repo", SignalTypeProfile { weight: 0.10, half_life_days: 21.0 }),
        ("org_created", SignalTypeProfile { weight: 0.10, half_life_days: 30.0 }),
        ("product_hunt_launch", SignalTypeProfile { weight: 0.20, half_life_days: 21.0 }),
        ("hacker_news_launch", SignalTypeProfile { weight: 0.15, half_life_days: 14.0 }),
        ("layoffs_detected", SignalTypeProfile { weight: 0.25, half_life_days: 30.0 }),
        ("domain_expired", SignalTypeProfile { weight: 0.20, half_life_days: 30.0 }),
    ]
    .into_iter()
    .collect()
}

pub fn is_hard_kill(signal_type: &str) -> bool {
    HARD_KILL_TYPES.contains(&signal_type)
}

pub fn is_alive(signal_type: &str) -> bool {
    ALIVE_TYPES.contains(&signal_type)
}

pub fn is_negative(signal_type: &str) -> bool {
    NEGATIVE_TYPES.contains(&signal_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_kill_types_are_a_subset_of_negative_types() {
        for t in HARD_KILL_TYPES {
            assert!(is_negative(t));
        }
    }

    #[test]
    fn default_table_covers_every_named_type() {
        let table = default_signal_type_table();
        for t in ALIVE_TYPES.iter().chain(NEGATIVE_TYPES.iter()) {
            if is_hard_kill(t) {
                continue;
            }
            assert!(table.contains_key(t), "missing weight profile for {t}");
        }
    }
}
