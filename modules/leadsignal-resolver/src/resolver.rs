use serde_json::{json, Map, Value as Json};

use leadsignal_common::CanonicalKey;
use leadsignal_store::SourceAsset;

use crate::candidate::{ResolutionCandidate, ResolutionMethod};
use crate::config::ResolverConfig;
use crate::should_skip_domain;

/// Orchestrates asset-to-lead resolution across the `domain_match`,
/// `org_match`, and `heuristic` strategies (`name_similarity` is a
/// reserved, disabled slot).
pub struct EntityResolver {
    config: ResolverConfig,
}

impl EntityResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Run every enabled strategy and return candidates sorted by
    /// confidence, highest first.
    pub fn find_candidates(&self, asset: &SourceAsset) -> Vec<ResolutionCandidate> {
        let mut candidates = Vec::new();

        if self.config.enable_domain_match {
            if let Some(candidate) = self.resolve_by_domain(asset) {
                candidates.push(candidate);
            }
        }
        if self.config.enable_org_match {
            if let Some(candidate) = self.resolve_by_org(asset) {
                candidates.push(candidate);
            }
        }
        if self.config.enable_heuristic {
            if let Some(candidate) = self.resolve_by_heuristic(asset) {
                candidates.push(candidate);
            }
        }
        // `name_similarity` intentionally not evaluated; see ResolverConfig.

        candidates.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
        candidates
    }

    pub fn get_best_candidate(
        &self,
        asset: &SourceAsset,
        min_confidence: f64,
    ) -> Option<ResolutionCandidate> {
        self.find_candidates(asset).into_iter().find(|c| c.confidence >= min_confidence)
    }

    fn resolve_by_domain(&self, asset: &SourceAsset) -> Option<ResolutionCandidate> {
        let payload = &asset.raw_payload;
        let url = match asset.source_type.as_str() {
            "github_repo" | "github" => get_str(payload, "homepage"),
            "product_hunt" => get_str(payload, "website"),
            "hacker_news" => get_str(payload, "url"),
            _ => get_str(payload, "homepage")
                .or_else(|| get_str(payload, "website"))
                .or_else(|| get_str(payload, "url")),
        }?;

        let domain = CanonicalKey::from_domain(url)?;
        if should_skip_domain(domain.value()) {
            tracing::debug!(domain = domain.value(), "skipping non-company domain");
            return None;
        }

        let mut metadata = Map::new();
        metadata.insert("source_url".into(), json!(url));
        metadata.insert("domain".into(), json!(domain.value()));

        Some(ResolutionCandidate {
            lead_canonical_key: domain.to_string(),
            confidence: self.config.domain_match_confidence,
            method: ResolutionMethod::DomainMatch,
            reason: format!("domain extracted from url: {url}"),
            metadata,
        })
    }

    fn resolve_by_org(&self, asset: &SourceAsset) -> Option<ResolutionCandidate> {
        if !matches!(asset.source_type.as_str(), "github_repo" | "github") {
            return None;
        }

        let payload = &asset.raw_payload;
        let org = get_str(payload, "owner")
            .map(str::to_string)
            .or_else(|| payload.get("owner").and_then(|o| o.get("login")).and_then(Json::as_str).map(str::to_string))
            .or_else(|| asset.external_id.split('/').next().map(str::to_string))
            .filter(|s| !s.is_empty())?;

        let canonical_key = CanonicalKey::from_github_org(&org)?;

        let looks_personal = org.len() < 4 || (org == org.to_lowercase() && !org.contains(['-', '_']));

        if looks_personal {
            let mut metadata = Map::new();
            metadata.insert("org".into(), json!(org));
            metadata.insert("possibly_personal".into(), json!(true));
            return Some(ResolutionCandidate {
                lead_canonical_key: canonical_key.to_string(),
                confidence: self.config.org_match_confidence * 0.7,
                method: ResolutionMethod::OrgMatch,
                reason: format!("github org (possibly personal): {org}"),
                metadata,
            });
        }

        let mut metadata = Map::new();
        metadata.insert("org".into(), json!(org));
        Some(ResolutionCandidate {
            lead_canonical_key: canonical_key.to_string(),
            confidence: self.config.org_match_confidence,
            method: ResolutionMethod::OrgMatch,
            reason: format!("github organization: {org}"),
            metadata,
        })
    }

    fn resolve_by_heuristic(&self, asset: &SourceAsset) -> Option<ResolutionCandidate> {
        let payload = &asset.raw_payload;
        let (name, source) = match asset.source_type.as_str() {
            "github_repo" | "github" => {
                let name = asset.external_id.split('/').next_back()?.to_string();
                (name, "repo_name")
            }
            "product_hunt" => (get_str(payload, "name")?.to_string(), "product_name"),
            "hacker_news" => {
                let title = get_str(payload, "title")?;
                let stripped = title.strip_prefix("Show HN:")?.trim();
                (stripped.split_whitespace().next()?.to_string(), "hn_title")
            }
            _ => return None,
        };

        let normalized = normalize_name(&name);
        if normalized.len() < 2 {
            return None;
        }

        let location = get_str(payload, "location");
        let canonical_key = CanonicalKey::from_name_loc(&normalized, location)?;

        let mut metadata = Map::new();
        metadata.insert("name".into(), json!(name));
        metadata.insert("normalized".into(), json!(normalized));
        metadata.insert("source".into(), json!(source));

        Some(ResolutionCandidate {
            lead_canonical_key: canonical_key.to_string(),
            confidence: self.config.heuristic_confidence,
            method: ResolutionMethod::Heuristic,
            reason: format!("name extracted from {source}: {name}"),
            metadata,
        })
    }
}

fn get_str<'a>(payload: &'a Json, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Json::as_str)
}

const STRIPPED_SUFFIXES: &[&str] = &["inc", "llc", "ltd", "corp", "co", "io", "app"];

fn normalize_name(name: &str) -> String {
    let mut lower = name.to_lowercase();
    for suffix in STRIPPED_SUFFIXES {
        let with_dot = format!(" {suffix}.");
        let without_dot = format!(" {suffix}");
        if lower.ends_with(&with_dot) {
            lower.truncate(lower.len() - with_dot.len());
        } else if lower.ends_with(&without_dot) {
            lower.truncate(lower.len() - without_dot.len());
        }
    }

    let cleaned: String =
        lower.chars().map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' }).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn asset(source_type: &str, external_id: &str, raw_payload: Json) -> SourceAsset {
        SourceAsset {
            id: 1,
            source_type: source_type.to_string(),
            external_id: external_id.to_string(),
            raw_payload,
            fetched_at: Utc::now(),
            change_detected: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn domain_match_prefers_homepage_for_github_repos() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("github_repo", "acme/widget", json!({"homepage": "https://acme.ai"}));
        let candidate = resolver.get_best_candidate(&a, 0.0).unwrap();
        assert_eq!(candidate.lead_canonical_key, "domain:acme.ai");
        assert_eq!(candidate.method, ResolutionMethod::DomainMatch);
        assert_eq!(candidate.confidence, 0.9);
    }

    #[test]
    fn domain_match_skips_github_io_pages() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("github_repo", "acme/widget", json!({"homepage": "https://acme.github.io"}));
        let candidates = resolver.find_candidates(&a);
        assert!(candidates.iter().all(|c| c.method != ResolutionMethod::DomainMatch));
    }

    #[test]
    fn org_match_attenuates_personal_looking_orgs() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("github_repo", "jdoe/widget", json!({}));
        let candidate = resolver.get_best_candidate(&a, 0.0).unwrap();
        assert_eq!(candidate.lead_canonical_key, "github_org:jdoe");
        assert!((candidate.confidence - 0.75 * 0.7).abs() < 1e-9);
        assert_eq!(candidate.metadata.get("possibly_personal"), Some(&json!(true)));
    }

    #[test]
    fn org_match_keeps_full_confidence_for_org_looking_names() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("github_repo", "Acme-Robotics/widget", json!({}));
        let candidates = resolver.find_candidates(&a);
        let org_candidate = candidates.iter().find(|c| c.method == ResolutionMethod::OrgMatch).unwrap();
        assert_eq!(org_candidate.confidence, 0.75);
    }

    #[test]
    fn heuristic_normalizes_and_strips_suffixes() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("product_hunt", "acme-widget", json!({"name": "Acme Widget Inc."}));
        let candidate = resolver.get_best_candidate(&a, 0.0).unwrap();
        assert_eq!(candidate.lead_canonical_key, "name_loc:acme-widget");
    }

    #[test]
    fn heuristic_extracts_first_word_from_show_hn_title() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset("hacker_news", "123", json!({"title": "Show HN: Acme a tiny robotics sdk"}));
        let candidates = resolver.find_candidates(&a);
        let heuristic = candidates.iter().find(|c| c.method == ResolutionMethod::Heuristic).unwrap();
        assert_eq!(heuristic.lead_canonical_key, "name_loc:acme");
    }

    #[test]
    fn candidates_sorted_by_confidence_descending() {
        let resolver = EntityResolver::new(ResolverConfig::default());
        let a = asset(
            "github_repo",
            "acme/widget",
            json!({"homepage": "https://acme.ai", "owner": "acme-robotics"}),
        );
        let candidates = resolver.find_candidates(&a);
        assert!(candidates.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }
}
