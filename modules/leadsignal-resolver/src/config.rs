/// Confidence thresholds and strategy toggles for `EntityResolver`.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub domain_match_confidence: f64,
    pub org_match_confidence: f64,
    pub name_similarity_confidence: f64,
    pub heuristic_confidence: f64,

    pub enable_domain_match: bool,
    pub enable_org_match: bool,
    /// Reserved for future fuzzy name matching; always `false` for now.
    pub enable_name_similarity: bool,
    pub enable_heuristic: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            domain_match_confidence: 0.9,
            org_match_confidence: 0.75,
            name_similarity_confidence: 0.6,
            heuristic_confidence: 0.4,
            enable_domain_match: true,
            enable_org_match: true,
            enable_name_similarity: false,
            enable_heuristic: true,
        }
    }
}
