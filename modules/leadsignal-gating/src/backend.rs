use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

/// The structured shape an LLM backend must extract from its completion.
/// Mirrors the prompt's JSON contract field for field.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClassifierResponse {
    pub schema_version: String,
    pub label: String,
    pub confidence: f64,
    pub rationale: String,
}

/// Abstract LLM backend for the classifier's structured-extraction call.
/// Shaped after the host's own `Agent`/`PromptBuilder`/`OutputBuilder` trio:
/// a system preamble, a user prompt, generation parameters, and a single
/// schema-typed result rather than raw text the caller has to parse.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn extract_classification(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> anyhow::Result<ClassifierResponse>;
}

/// Claude-backed implementation. The host's own LLM client (`ai-client`) is
/// retrieved without its `tool` module and can't be linked against, so this
/// talks to the Messages API directly over `reqwest` instead of wrapping it.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), api_key: api_key.into(), model: model.into() }
    }
}

#[async_trait]
impl ClassifierBackend for AnthropicBackend {
    async fn extract_classification(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> anyhow::Result<ClassifierResponse> {
        #[derive(serde::Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(serde::Serialize)]
        struct Request<'a> {
            model: &'a str,
            system: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: String,
        }

        #[derive(Deserialize)]
        struct Response {
            content: Vec<ContentBlock>,
        }

        let body = Request {
            model: &self.model,
            system: system_prompt,
            messages: vec![Message { role: "user", content: user_prompt }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await?;

        let text = response
            .content
            .first()
            .map(|b| b.text.trim())
            .ok_or_else(|| anyhow::anyhow!("empty completion from classifier backend"))?;

        let cleaned = strip_markdown_fence(text);
        let parsed: ClassifierResponse = serde_json::from_str(cleaned)?;
        Ok(parsed)
    }
}

fn strip_markdown_fence(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.trim().trim_end_matches("```").trim()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_fence() {
        let text = "```\n{\"a\":1}\n```";
        assert_eq!(strip_markdown_fence(text), "{\"a\":1}");
    }

    #[test]
    fn strips_json_labeled_fence() {
        let text = "```json\n{\"a\":1}\n```";
        assert_eq!(strip_markdown_fence(text), "{\"a\":1}");
    }

    #[test]
    fn passes_through_unfenced_text() {
        assert_eq!(strip_markdown_fence("{\"a\":1}"), "{\"a\":1}");
    }
}
