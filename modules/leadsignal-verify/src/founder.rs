/// Centralized founder-scoring weights. The source material scattered
/// FAANG-alumnus and serial-founder heuristics across several modules
/// inconsistently; this repo keeps them here instead.
#[derive(Debug, Clone, Copy)]
pub struct FounderScoringConfig {
    pub base_score: f64,
    pub serial_founder_bonus: f64,
    pub notable_employer_bonus: f64,
}

impl Default for FounderScoringConfig {
    fn default() -> Self {
        Self { base_score: 0.3, serial_founder_bonus: 0.4, notable_employer_bonus: 0.3 }
    }
}

/// `founder_exists` means a `FounderProfile` row was found for the
/// canonical key; the serial-founder and notable-employer flags are
/// supplied by the caller (not persisted on `FounderProfile` itself).
/// Returns `None` when no founder record exists at all, matching the
/// verification gate's "no founder boost" case.
pub fn founder_score(
    founder_exists: bool,
    is_serial_founder: bool,
    is_notable_employer: bool,
    config: &FounderScoringConfig,
) -> Option<f64> {
    if !founder_exists {
        return None;
    }

    let mut score = config.base_score;
    if is_serial_founder {
        score += config.serial_founder_bonus;
    }
    if is_notable_employer {
        score += config.notable_employer_bonus;
    }
    Some(score.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_founder_record_yields_none() {
        assert_eq!(founder_score(false, true, true, &FounderScoringConfig::default()), None);
    }

    #[test]
    fn bare_founder_record_yields_base_score() {
        let score = founder_score(true, false, false, &FounderScoringConfig::default()).unwrap();
        assert_eq!(score, 0.3);
    }

    #[test]
    fn serial_founder_and_notable_employer_stack_and_clamp() {
        let score = founder_score(true, true, true, &FounderScoringConfig::default()).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn single_bonus_does_not_saturate() {
        let score = founder_score(true, true, false, &FounderScoringConfig::default()).unwrap();
        assert!((score - 0.7).abs() < 1e-9);
    }
}
