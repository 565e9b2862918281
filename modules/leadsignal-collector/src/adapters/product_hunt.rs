//! Polls today's Product Hunt launches.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use leadsignal_common::CanonicalKey;

use crate::collector::{CollectedSignal, Collector};
use crate::error::CollectorError;
use crate::http::http_get_json;
use crate::rate_limiter::global_pool;
use crate::retry::RetryConfig;

#[derive(Debug, Deserialize)]
struct LaunchesResponse {
    launches: Vec<Launch>,
}

#[derive(Debug, Deserialize)]
struct Launch {
    name: String,
    tagline: Option<String>,
    website: Option<String>,
    votes_count: Option<u64>,
}

/// Polls a fixed "today's launches" endpoint and emits one
/// `product_hunt_launch` signal per launch. Canonical key prefers the
/// linked website's domain, falling back to a `name_loc` key derived from
/// the product name when no website is given.
pub struct ProductHuntAdapter {
    client: reqwest::Client,
    launches_url: String,
}

impl ProductHuntAdapter {
    pub fn new(token: &str) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("User-Agent", "leadsignal-collector/0.1".parse().unwrap());
        if !token.is_empty() {
            let value = format!("Bearer {token}");
            if let Ok(header_value) = value.parse() {
                headers.insert(reqwest::header::AUTHORIZATION, header_value);
            }
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build Product Hunt HTTP client");

        Self { client, launches_url: "https://api.producthunt.com/v2/today".to_string() }
    }

    pub fn with_launches_url(mut self, url: &str) -> Self {
        self.launches_url = url.to_string();
        self
    }
}

#[async_trait]
impl Collector for ProductHuntAdapter {
    fn collector_name(&self) -> &str {
        "product_hunt"
    }

    fn api_name(&self) -> &str {
        "product_hunt"
    }

    fn retry_policy(&self) -> RetryConfig {
        RetryConfig::default()
    }

    async fn collect(&self) -> Result<Vec<CollectedSignal>, CollectorError> {
        let response: LaunchesResponse = http_get_json(
            &self.client,
            global_pool(),
            self.api_name(),
            &self.launches_url,
            &self.retry_policy(),
        )
        .await?;

        let mut signals = Vec::new();
        for launch in response.launches {
            let canonical_key = launch
                .website
                .as_deref()
                .and_then(CanonicalKey::from_domain)
                .or_else(|| CanonicalKey::from_name_loc(&launch.name, None));
            let Some(canonical_key) = canonical_key else { continue };

            signals.push(CollectedSignal {
                signal_type: "product_hunt_launch".to_string(),
                canonical_key_candidates: vec![canonical_key.to_string()],
                confidence: 0.4,
                raw_data: json!({
                    "name": launch.name,
                    "tagline": launch.tagline,
                    "website": launch.website,
                    "votes_count": launch.votes_count,
                }),
                company_name: Some(launch.name),
                detected_at: None,
            });
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_domain_key_over_name_loc() {
        let launch = Launch {
            name: "Acme Widget".to_string(),
            tagline: None,
            website: Some("https://acme.ai".to_string()),
            votes_count: Some(10),
        };
        let key = launch
            .website
            .as_deref()
            .and_then(CanonicalKey::from_domain)
            .or_else(|| CanonicalKey::from_name_loc(&launch.name, None))
            .unwrap();
        assert_eq!(key.to_string(), "domain:acme.ai");
    }

    #[test]
    fn falls_back_to_name_loc_without_website() {
        let launch = Launch { name: "Acme Widget".to_string(), tagline: None, website: None, votes_count: None };
        let key = launch
            .website
            .as_deref()
            .and_then(CanonicalKey::from_domain)
            .or_else(|| CanonicalKey::from_name_loc(&launch.name, None))
            .unwrap();
        assert_eq!(key.to_string(), "name_loc:acme-widget");
    }
}
