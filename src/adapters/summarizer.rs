//! Generative-text summarizers (Gemini, OpenAI).

use crate::domain::model::Release;
use crate::domain::ports::Summarizer;
use crate::utils::error::{NotifierError, Result};
use crate::utils::text::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENAI_API_URL: &str = "https://api.openai.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Release bodies longer than this are cut before prompting.
const MAX_BODY_CHARS: usize = 6000;

fn build_prompt(product: &str, release: &Release, body: &str, language: &str) -> String {
    format!(
        "Role: you write release-note summaries for a Slack channel. Write only in {language}, tersely. \
No exaggeration, speculation or greetings.\n\
Output format (use exactly):\n\
Breaking:\n• ...\n\
Deprecated:\n• ...\n\
Features:\n• ...\n\
BugFixes:\n• ...\n\
Dependency:\n• ...\n\
Docs:\n• ...\n\
Notes:\n• ... (only when there is another important note)\n\
- Omit a heading entirely when it has no items.\n\
- Every bullet starts with '• ' and stays under 120 characters.\n\
- Prefer Breaking/Deprecated/Dependency items and use at most 8 bullets in total.\n\
- If nothing is notable, return the single line '• No notable changes'.\n\n\
Product: {product}\n\
Version: {tag}\n\
Release notes:\n{body}",
        language = language,
        product = product,
        tag = release.tag_name,
        body = body,
    )
}

/// Trimmed body ready for prompting, `None` when there is nothing to summarize.
fn prompt_body(release: &Release) -> Option<&str> {
    let body = release.body.trim();
    if body.is_empty() {
        None
    } else {
        Some(truncate_chars(body, MAX_BODY_CHARS))
    }
}

async fn post_json(request: reqwest::RequestBuilder, payload: &Value) -> Result<Value> {
    let response = request.json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NotifierError::SummaryError {
            message: format!("provider returned {}: {}", status.as_u16(), body.trim()),
        });
    }
    Ok(response.json().await?)
}

pub struct GeminiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: &str, model: &str, language: &str) -> Result<Self> {
        Self::with_base_url(GEMINI_API_URL, api_key, model, language)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, model: &str, language: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(NotifierError::MissingConfigError {
                field: "GEMINI_API_KEY".to_string(),
            });
        }
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn provider_name(&self) -> &str {
        "Gemini"
    }

    async fn summarize(&self, product: &str, release: &Release) -> Result<Option<String>> {
        let Some(body) = prompt_body(release) else {
            return Ok(None);
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let payload = json!({
            "contents": [{"parts": [{"text": build_prompt(product, release, body, &self.language)}]}]
        });
        let request = self.client.post(&url).query(&[("key", &self.api_key)]);
        let parsed = post_json(request, &payload).await?;

        let candidates = parsed["candidates"].as_array().cloned().unwrap_or_default();
        for candidate in &candidates {
            let parts = candidate["content"]["parts"].as_array();
            let summary = parts
                .into_iter()
                .flatten()
                .filter_map(|p| p["text"].as_str())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !summary.is_empty() {
                return Ok(Some(summary));
            }
        }

        Err(NotifierError::SummaryError {
            message: "Gemini response missing summary".to_string(),
        })
    }
}

pub struct OpenAiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: &str, model: &str, language: &str) -> Result<Self> {
        Self::with_base_url(OPENAI_API_URL, api_key, model, language)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, model: &str, language: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(NotifierError::MissingConfigError {
                field: "OPENAI_API_KEY".to_string(),
            });
        }
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    async fn summarize(&self, product: &str, release: &Release) -> Result<Option<String>> {
        let Some(body) = prompt_body(release) else {
            return Ok(None);
        };

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": build_prompt(product, release, body, &self.language)}
            ]
        });
        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key);
        let parsed = post_json(request, &payload).await?;

        match parsed["choices"][0]["message"]["content"].as_str().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(Some(text.to_string())),
            _ => Err(NotifierError::SummaryError {
                message: "OpenAI response missing summary".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn release(body: &str) -> Release {
        Release {
            tag_name: "v3.2.0".to_string(),
            name: "v3.2.0".to_string(),
            body: body.to_string(),
            ..Release::default()
        }
    }

    #[tokio::test]
    async fn test_gemini_joins_text_parts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .query_param("key", "k")
                .body_contains("Version: v3.2.0");
            then.status(200).json_body(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "  "}]}},
                    {"content": {"parts": [{"text": "Breaking:\n"}, {"text": "• gone "}]}}
                ]
            }));
        });

        let summarizer =
            GeminiSummarizer::with_base_url(&server.base_url(), "k", DEFAULT_GEMINI_MODEL, "English")
                .unwrap();
        let summary = summarizer
            .summarize("Spring Boot", &release("## Breaking\n- gone"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(summary.as_deref(), Some("Breaking:\n• gone"));
    }

    #[tokio::test]
    async fn test_gemini_without_candidates_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({"candidates": []}));
        });

        let summarizer =
            GeminiSummarizer::with_base_url(&server.base_url(), "k", "m", "English").unwrap();
        let err = summarizer
            .summarize("Spring Boot", &release("text"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::SummaryError { .. }));
    }

    #[tokio::test]
    async fn test_empty_body_skips_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(500);
        });

        let summarizer =
            GeminiSummarizer::with_base_url(&server.base_url(), "k", "m", "English").unwrap();
        assert!(summarizer
            .summarize("Spring Boot", &release("   \n"))
            .await
            .unwrap()
            .is_none());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_openai_reads_first_choice() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .body_contains("\"model\":\"gpt-4o\"");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "• No notable changes\n"}}]
            }));
        });

        let summarizer =
            OpenAiSummarizer::with_base_url(&server.base_url(), "sk-test", DEFAULT_OPENAI_MODEL, "English")
                .unwrap();
        let summary = summarizer
            .summarize("Spring Framework", &release("- fix"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(summary.as_deref(), Some("• No notable changes"));
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(GeminiSummarizer::new(" ", DEFAULT_GEMINI_MODEL, "English").is_err());
        assert!(OpenAiSummarizer::new("", DEFAULT_OPENAI_MODEL, "English").is_err());
    }

    #[test]
    fn test_prompt_body_is_truncated() {
        let long = "x".repeat(MAX_BODY_CHARS + 50);
        assert_eq!(prompt_body(&release(&long)).unwrap().len(), MAX_BODY_CHARS);
    }
}
