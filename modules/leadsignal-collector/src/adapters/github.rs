//! Watches a fixed list of GitHub repos for star-count spikes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use leadsignal_common::CanonicalKey;
use leadsignal_store::Store;

use crate::collector::{CollectedSignal, Collector};
use crate::delta::{classify_delta, DeltaKind};
use crate::error::CollectorError;
use crate::http::http_get_json;
use crate::rate_limiter::global_pool;
use crate::retry::RetryConfig;

#[derive(Debug, Deserialize)]
struct GithubRepoResponse {
    full_name: String,
    stargazers_count: u64,
}

/// Polls `GET /repos/{owner}/{repo}` for each watched repo and emits a
/// `github_spike` signal when the star count crosses `star_delta_threshold`
/// (a fractional increase) since the last recorded snapshot.
pub struct GithubAdapter {
    client: reqwest::Client,
    store: Store,
    watched_repos: Vec<String>,
    star_delta_threshold: f64,
}

impl GithubAdapter {
    pub fn new(store: Store, token: &str, watched_repos: Vec<String>) -> Self {
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
            .expect("failed to build GitHub HTTP client");

        Self { client, store, watched_repos, star_delta_threshold: 0.2 }
    }

    pub fn with_star_delta_threshold(mut self, threshold: f64) -> Self {
        self.star_delta_threshold = threshold;
        self
    }
}

#[async_trait]
impl Collector for GithubAdapter {
    fn collector_name(&self) -> &str {
        "github"
    }

    fn api_name(&self) -> &str {
        "github"
    }

    fn retry_policy(&self) -> RetryConfig {
        RetryConfig::default()
    }

    async fn collect(&self) -> Result<Vec<CollectedSignal>, CollectorError> {
        let mut signals = Vec::new();

        for repo in &self.watched_repos {
            let url = format!("https://api.github.com/repos/{repo}");
            let response: GithubRepoResponse =
                http_get_json(&self.client, global_pool(), self.api_name(), &url, &self.retry_policy()).await?;

            let previous = self.store.get_latest_snapshot("github", repo).await?;
            let previous_stars = previous
                .as_ref()
                .and_then(|p| p.raw_payload.get("stargazers_count"))
                .and_then(|v| v.as_f64());

            let current_stars = response.stargazers_count as f64;
            let delta_kind = classify_delta(previous_stars, current_stars, self.star_delta_threshold);
            let raw_payload = json!({
                "full_name": response.full_name,
                "stargazers_count": response.stargazers_count,
            });

            self.store
                .save_asset("github", repo, &raw_payload, matches!(delta_kind, DeltaKind::Changed))
                .await?;

            if delta_kind == DeltaKind::Changed {
                let Some(canonical_key) = CanonicalKey::from_github_repo(repo) else { continue };
                signals.push(CollectedSignal {
                    signal_type: "github_spike".to_string(),
                    canonical_key_candidates: vec![canonical_key.to_string()],
                    confidence: 0.5,
                    raw_data: raw_payload,
                    company_name: Some(response.full_name.clone()),
                    detected_at: None,
                });
            }
        }

        Ok(signals)
    }
}
