use std::sync::Arc;

use leadsignal_store::{FounderProfile, Store};

use crate::connector::CrmConnector;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct FounderSyncStats {
    pub companies_processed: u32,
    pub founders_found: u32,
    pub founders_synced: u32,
    pub founders_skipped_no_linkedin: u32,
    pub founders_skipped_invalid_linkedin: u32,
    pub founders_conflicts: u32,
    pub errors: Vec<String>,
}

pub struct FounderSyncConfig {
    /// When true (the default), a LinkedIn URL already linked to a
    /// different canonical key is logged and left alone rather than
    /// relinked out from under the existing company.
    pub skip_relinks: bool,
    pub dry_run: bool,
}

impl Default for FounderSyncConfig {
    fn default() -> Self {
        Self { skip_relinks: true, dry_run: false }
    }
}

/// Periodic job, independent of the main discovery pipeline, that enumerates
/// the CRM and links founder LinkedIn identities to canonical companies.
pub struct FounderSync {
    store: Arc<Store>,
    connector: Arc<dyn CrmConnector>,
    config: FounderSyncConfig,
}

impl FounderSync {
    pub fn new(store: Arc<Store>, connector: Arc<dyn CrmConnector>, config: FounderSyncConfig) -> Self {
        Self { store, connector, config }
    }

    pub async fn run(&self) -> Result<FounderSyncStats> {
        let mut stats = FounderSyncStats::default();

        let records = self.connector.enumerate_records().await?;

        for record in &records {
            stats.companies_processed += 1;

            let Some(canonical_key) = self.connector.extract_canonical_key(record) else {
                continue;
            };

            if record.founder_linkedin_urls.is_empty() {
                stats.founders_skipped_no_linkedin += 1;
                continue;
            }
            stats.founders_found += 1;

            for url in &record.founder_linkedin_urls {
                let Some((founder_key, linkedin_url)) = normalize_linkedin_person_url(url) else {
                    stats.founders_skipped_invalid_linkedin += 1;
                    tracing::debug!(url, "invalid linkedin url");
                    continue;
                };

                let name = record.company_name.clone().unwrap_or_else(|| fallback_name_from_slug(&founder_key));

                if self.config.skip_relinks {
                    if let Some(existing) = self.store.get_founder(&founder_key).await? {
                        if existing.canonical_key != canonical_key {
                            stats.founders_conflicts += 1;
                            tracing::warn!(
                                founder_key,
                                existing = existing.canonical_key,
                                attempted = canonical_key,
                                "skipping relink, founder already linked elsewhere"
                            );
                            continue;
                        }
                    }
                }

                if self.config.dry_run {
                    tracing::info!(name, founder_key, canonical_key, "dry run: would sync founder");
                    stats.founders_synced += 1;
                    continue;
                }

                let profile = FounderProfile {
                    founder_key: founder_key.clone(),
                    canonical_key: canonical_key.clone(),
                    name,
                    source_api: "notion".to_string(),
                    linkedin_url,
                    updated_at: chrono::Utc::now(),
                };

                match self.store.save_founder(&profile).await {
                    Ok(()) => stats.founders_synced += 1,
                    Err(e) => stats.errors.push(format!("failed to save {founder_key}: {e}")),
                }
            }
        }

        Ok(stats)
    }
}

/// Accepts bare, scheme-less, and `www.`-prefixed `linkedin.com/in/<slug>`
/// URLs. Returns `(founder_key, canonical_profile_url)`.
fn normalize_linkedin_person_url(url: &str) -> Option<(String, String)> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("linkedin.com/") {
        format!("https://{trimmed}")
    } else {
        return None;
    };

    let parsed = url::Url::parse(&with_scheme).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host != "linkedin.com" {
        return None;
    }

    let segments: Vec<&str> = parsed.path().trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 || segments[0].to_lowercase() != "in" {
        return None;
    }

    let slug = segments[1].trim();
    if slug.is_empty() {
        return None;
    }

    let founder_key = format!("linkedin:{}", slug.to_lowercase());
    let canonical_profile_url = format!("https://www.linkedin.com/in/{slug}");
    Some((founder_key, canonical_profile_url))
}

fn fallback_name_from_slug(founder_key: &str) -> String {
    let slug = founder_key.split(':').nth(1).unwrap_or(founder_key);
    slug.replace(['-', '_'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_linkedin_slug_url() {
        let (key, canonical) = normalize_linkedin_person_url("linkedin.com/in/jane-doe").unwrap();
        assert_eq!(key, "linkedin:jane-doe");
        assert_eq!(canonical, "https://www.linkedin.com/in/jane-doe");
    }

    #[test]
    fn normalizes_full_https_url_with_www() {
        let (key, _) = normalize_linkedin_person_url("https://www.linkedin.com/in/Jane-Doe/").unwrap();
        assert_eq!(key, "linkedin:jane-doe");
    }

    #[test]
    fn rejects_non_linkedin_hosts() {
        assert!(normalize_linkedin_person_url("https://twitter.com/in/jane-doe").is_none());
    }

    #[test]
    fn rejects_company_pages() {
        assert!(normalize_linkedin_person_url("https://www.linkedin.com/company/acme").is_none());
    }

    #[test]
    fn fallback_name_humanizes_the_slug() {
        assert_eq!(fallback_name_from_slug("linkedin:jane-doe"), "jane doe");
    }
}
