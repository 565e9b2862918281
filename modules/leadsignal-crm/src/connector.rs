use async_trait::async_trait;

use crate::error::Result;
use crate::payload::{CrmRecord, ProspectPayload, UpsertResult};

/// External CRM boundary. Idempotency of `upsert_prospect` given the same
/// canonical key is the connector's responsibility, not the caller's.
#[async_trait]
pub trait CrmConnector: Send + Sync {
    async fn upsert_prospect(&self, payload: &ProspectPayload) -> Result<UpsertResult>;
    async fn enumerate_records(&self) -> Result<Vec<CrmRecord>>;
    fn extract_canonical_key(&self, record: &CrmRecord) -> Option<String>;
}

/// A connector over a Notion database used as the CRM backend. One page per
/// prospect; `upsert_prospect` queries by canonical key before deciding
/// whether to create or update.
pub struct NotionConnector {
    client: reqwest::Client,
    api_token: String,
    database_id: String,
}

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

impl NotionConnector {
    pub fn new(api_token: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_token: api_token.into(), database_id: database_id.into() }
    }

    fn canonical_key_of(properties: &serde_json::Value) -> Option<String> {
        let canonical = properties.get("Canonical Key").and_then(|p| p.get("rich_text")).and_then(|rt| rt.get(0));
        if let Some(text) = canonical.and_then(|t| t.get("plain_text")).and_then(|t| t.as_str()) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
        let website = properties.get("Website").and_then(|p| p.get("url")).and_then(|u| u.as_str())?;
        leadsignal_common::CanonicalKey::from_domain(website).map(|k| k.to_string())
    }

    fn status_of(properties: &serde_json::Value) -> String {
        if let Some(name) = properties
            .get("Status")
            .and_then(|p| p.get("status"))
            .and_then(|s| s.get("name"))
            .and_then(|n| n.as_str())
        {
            return name.to_string();
        }
        properties
            .get("Status")
            .and_then(|p| p.get("select"))
            .and_then(|s| s.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[async_trait]
impl CrmConnector for NotionConnector {
    async fn upsert_prospect(&self, payload: &ProspectPayload) -> Result<UpsertResult> {
        tracing::info!(canonical_key = %payload.canonical_key, "notion: upserting prospect");

        let query = self
            .client
            .post(format!("{NOTION_API_BASE}/databases/{}/query", self.database_id))
            .bearer_auth(&self.api_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&serde_json::json!({
                "filter": {
                    "property": "Canonical Key",
                    "rich_text": { "equals": payload.canonical_key },
                },
            }))
            .send()
            .await
            .map_err(|e| crate::error::CrmError::Request(e.to_string()))?;

        if !query.status().is_success() {
            let status = query.status();
            let body = query.text().await.unwrap_or_default();
            return Err(crate::error::CrmError::Request(format!("notion query {status}: {body}")));
        }

        let body: serde_json::Value =
            query.json().await.map_err(|e| crate::error::CrmError::InvalidResponse(e.to_string()))?;
        let existing_page_id =
            body.get("results").and_then(|r| r.as_array()).and_then(|arr| arr.first()).and_then(|p| p.get("id")).and_then(|id| id.as_str());

        let properties = build_notion_properties(payload);

        let (method, url) = match existing_page_id {
            Some(page_id) => (reqwest::Method::PATCH, format!("{NOTION_API_BASE}/pages/{page_id}")),
            None => (reqwest::Method::POST, format!("{NOTION_API_BASE}/pages")),
        };

        let mut request = self.client.request(method, url).bearer_auth(&self.api_token).header("Notion-Version", NOTION_VERSION);
        request = match existing_page_id {
            Some(_) => request.json(&serde_json::json!({ "properties": properties })),
            None => request.json(&serde_json::json!({
                "parent": { "database_id": self.database_id },
                "properties": properties,
            })),
        };

        let response = request.send().await.map_err(|e| crate::error::CrmError::Request(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(crate::error::CrmError::Request(format!("notion upsert {status}: {body}")));
        }

        let written: serde_json::Value =
            response.json().await.map_err(|e| crate::error::CrmError::InvalidResponse(e.to_string()))?;
        let page_id = written.get("id").and_then(|id| id.as_str()).unwrap_or_default().to_string();

        Ok(UpsertResult {
            status: if existing_page_id.is_some() { crate::payload::UpsertStatus::Updated } else { crate::payload::UpsertStatus::Created },
            page_id,
            reason: None,
        })
    }

    async fn enumerate_records(&self) -> Result<Vec<CrmRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = serde_json::json!({});
            if let Some(c) = &cursor {
                body["start_cursor"] = serde_json::Value::String(c.clone());
            }

            let response = self
                .client
                .post(format!("{NOTION_API_BASE}/databases/{}/query", self.database_id))
                .bearer_auth(&self.api_token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| crate::error::CrmError::Request(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(crate::error::CrmError::Request(format!("notion enumerate {status}: {text}")));
            }

            let page: serde_json::Value =
                response.json().await.map_err(|e| crate::error::CrmError::InvalidResponse(e.to_string()))?;

            for result in page.get("results").and_then(|r| r.as_array()).into_iter().flatten() {
                let page_id = result.get("id").and_then(|id| id.as_str()).unwrap_or_default().to_string();
                let properties = result.get("properties").cloned().unwrap_or(serde_json::json!({}));
                records.push(CrmRecord {
                    canonical_key: Self::canonical_key_of(&properties),
                    website: properties.get("Website").and_then(|p| p.get("url")).and_then(|u| u.as_str()).map(String::from),
                    status: Self::status_of(&properties),
                    company_name: properties
                        .get("Name")
                        .and_then(|p| p.get("title"))
                        .and_then(|t| t.get(0))
                        .and_then(|t| t.get("plain_text"))
                        .and_then(|t| t.as_str())
                        .map(String::from),
                    founder_linkedin_urls: Vec::new(),
                    page_id,
                });
            }

            let has_more = page.get("has_more").and_then(|h| h.as_bool()).unwrap_or(false);
            if !has_more {
                break;
            }
            cursor = page.get("next_cursor").and_then(|c| c.as_str()).map(String::from);
            if cursor.is_none() {
                break;
            }
        }

        Ok(records)
    }

    fn extract_canonical_key(&self, record: &CrmRecord) -> Option<String> {
        record.canonical_key.clone().or_else(|| record.website.as_deref().and_then(|w| leadsignal_common::CanonicalKey::from_domain(w)).map(|k| k.to_string()))
    }
}

fn build_notion_properties(payload: &ProspectPayload) -> serde_json::Value {
    serde_json::json!({
        "Name": { "title": [{ "text": { "content": payload.company_name } }] },
        "Canonical Key": { "rich_text": [{ "text": { "content": payload.canonical_key } }] },
        "Website": { "url": if payload.website.is_empty() { None } else { Some(payload.website.clone()) } },
        "Status": { "select": { "name": payload.status } },
        "Confidence": { "number": payload.confidence_score },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_canonical_key_falls_back_to_website_domain() {
        let connector = NotionConnector::new("token", "db");
        let record = CrmRecord {
            page_id: "p1".to_string(),
            canonical_key: None,
            website: Some("https://www.acme.ai/".to_string()),
            status: "Tracking".to_string(),
            company_name: Some("Acme".to_string()),
            founder_linkedin_urls: vec![],
        };
        assert_eq!(connector.extract_canonical_key(&record), Some("domain:acme.ai".to_string()));
    }

    #[test]
    fn extract_canonical_key_prefers_explicit_key() {
        let connector = NotionConnector::new("token", "db");
        let record = CrmRecord {
            page_id: "p1".to_string(),
            canonical_key: Some("companies_house:12345678".to_string()),
            website: Some("https://acme.ai".to_string()),
            status: "Tracking".to_string(),
            company_name: None,
            founder_linkedin_urls: vec![],
        };
        assert_eq!(connector.extract_canonical_key(&record), Some("companies_house:12345678".to_string()));
    }
}
