/// AI Extraction Client — the single point of entry for completion-provider
/// calls in Folio.
///
/// The backend is selected by configuration alone: both supported providers
/// speak the same chat-completion wire shape (bearer auth, `{model,
/// temperature, messages}` in, `choices[0].message.content` out), so
/// swapping them never touches the extraction algorithm.
use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use crate::ai_client::prompts::{EXTRACT_PROMPT_PREFIX, EXTRACT_SYSTEM, REPAIR_PROMPT_PREFIX};
use crate::config::Config;
use crate::schemas::{ParsedResume, ValidationError};

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Near-deterministic sampling so repeated extractions of the same resume
/// stay reproducible.
const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("missing API key for the configured AI provider")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider response missing content")]
    EmptyContent,

    #[error("model did not return JSON content")]
    NoJson,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] ValidationError),

    #[error("could not obtain valid JSON after one repair round-trip")]
    Unrecoverable,
}

/// Endpoint/key/model triple for one completion backend. Providers are
/// structurally identical descriptors resolved by a flat factory — there is
/// no per-provider behavior beyond these three values.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ProviderConfig {
    pub fn resolve(config: &Config) -> Self {
        match config.ai_provider.as_str() {
            "openrouter" => Self {
                endpoint: OPENROUTER_ENDPOINT.to_string(),
                api_key: config.openrouter_api_key.clone(),
                model: config.openrouter_model.clone(),
            },
            _ => Self {
                endpoint: GROQ_ENDPOINT.to_string(),
                api_key: config.groq_api_key.clone(),
                model: config.groq_model.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct AiClient {
    client: Client,
    provider: ProviderConfig,
}

impl AiClient {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            provider,
        }
    }

    /// Sends one chat completion and returns the raw message content.
    async fn chat(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self
            .provider
            .api_key
            .as_deref()
            .ok_or(AiError::MissingCredentials)?;

        let body = ChatRequest {
            model: &self.provider.model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: EXTRACT_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.provider.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("completion provider returned {status}: {message}");
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json::<ChatResponse>().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyContent)
    }

    /// Runs the full structured-extraction flow: prompt, brace-slice, parse,
    /// strict-validate, with at most one repair round-trip.
    pub async fn extract_structured(&self, resume_text: &str) -> Result<ParsedResume, AiError> {
        let prompt = format!("{EXTRACT_PROMPT_PREFIX}{resume_text}");
        let first = self.chat(&prompt).await?;

        parse_with_repair(&first, |bad_text| async move {
            let repair_prompt = format!("{REPAIR_PROMPT_PREFIX}{bad_text}");
            self.chat(&repair_prompt).await
        })
        .await
    }
}

/// Slices the JSON object span out of free-form model output: first `{` to
/// last `}`. Tolerates providers that wrap JSON in prose or code fences.
fn extract_json_span(value: &str) -> Result<&str, AiError> {
    let start = value.find('{').ok_or(AiError::NoJson)?;
    let end = value.rfind('}').ok_or(AiError::NoJson)?;
    if end <= start {
        return Err(AiError::NoJson);
    }
    Ok(&value[start..=end])
}

/// One extraction candidate: slice, parse, strict-validate.
fn parse_candidate(raw: &str) -> Result<ParsedResume, AiError> {
    let parsed: ParsedResume = serde_json::from_str(extract_json_span(raw)?)?;
    parsed.validate_strict()?;
    Ok(parsed)
}

/// Parses model output, with a single repair round-trip on failure.
///
/// The flow is a fixed two-attempt sequence, never a loop: the first
/// candidate is parsed; if malformed, the `repair` future is awaited once
/// and its result parsed; a second malformed result is terminal. Provider
/// transport failures during repair propagate as themselves — only a
/// malformed *result* becomes `Unrecoverable`.
pub async fn parse_with_repair<F, Fut>(raw: &str, repair: F) -> Result<ParsedResume, AiError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, AiError>>,
{
    match parse_candidate(raw) {
        Ok(parsed) => Ok(parsed),
        Err(reason) => {
            debug!("first extraction candidate rejected: {reason}");
            let repaired = repair(raw.to_string()).await?;
            parse_candidate(&repaired).map_err(|second| {
                warn!("repair round-trip also rejected: {second}");
                AiError::Unrecoverable
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const VALID_JSON: &str = r#"{
        "name": "Alex",
        "headline": "Developer",
        "summary": "Summary",
        "skills": ["Rust"],
        "experience": [],
        "education": [],
        "projects": [],
        "links": []
    }"#;

    fn test_config(provider: &str) -> Config {
        Config {
            database_url: String::new(),
            s3_bucket: String::new(),
            s3_endpoint: String::new(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            ai_provider: provider.to_string(),
            groq_api_key: Some("groq-key".to_string()),
            groq_model: "llama-3.1-8b-instant".to_string(),
            openrouter_api_key: None,
            openrouter_model: "meta-llama/llama-3.1-8b-instruct:free".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_json_span_plain_object() {
        assert_eq!(extract_json_span(r#"{"a": 1}"#).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_json_span_strips_prose_and_fences() {
        let wrapped = "Sure, here you go:\n```json\n{\"a\": 1}\n```\nLet me know!";
        assert_eq!(extract_json_span(wrapped).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_json_span_rejects_missing_braces() {
        assert!(matches!(extract_json_span("no json here"), Err(AiError::NoJson)));
        assert!(matches!(extract_json_span("} backwards {"), Err(AiError::NoJson)));
    }

    #[tokio::test]
    async fn test_repair_recovers_invalid_first_response() {
        let parsed = parse_with_repair("invalid", |_bad| async { Ok(VALID_JSON.to_string()) })
            .await
            .unwrap();
        assert_eq!(parsed.name, "Alex");
        assert_eq!(parsed.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_valid_first_response_skips_repair() {
        let repair_calls = AtomicUsize::new(0);
        let parsed = parse_with_repair(VALID_JSON, |_bad| {
            repair_calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(String::new()) }
        })
        .await
        .unwrap();
        assert_eq!(parsed.name, "Alex");
        assert_eq!(repair_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_double_failure_is_unrecoverable_after_one_repair() {
        let repair_calls = AtomicUsize::new(0);
        let result = parse_with_repair("still not json", |_bad| {
            repair_calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("also not json".to_string()) }
        })
        .await;

        assert!(matches!(result, Err(AiError::Unrecoverable)));
        // One repair call on top of the initial response: two provider
        // round-trips total, never three.
        assert_eq!(repair_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schema_invalid_repair_result_is_unrecoverable() {
        let bad_schema = r#"{"links": [{"label": "Site", "url": "not-a-url"}]}"#;
        let result =
            parse_with_repair("invalid", |_bad| async move { Ok(bad_schema.to_string()) }).await;
        assert!(matches!(result, Err(AiError::Unrecoverable)));
    }

    #[tokio::test]
    async fn test_provider_failure_during_repair_propagates() {
        let result = parse_with_repair("invalid", |_bad| async {
            Err(AiError::Api {
                status: 500,
                message: "upstream down".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(AiError::Api { status: 500, .. })));
    }

    #[test]
    fn test_provider_factory_defaults_to_groq() {
        let provider = ProviderConfig::resolve(&test_config("groq"));
        assert_eq!(provider.endpoint, GROQ_ENDPOINT);
        assert_eq!(provider.api_key.as_deref(), Some("groq-key"));
        assert_eq!(provider.model, "llama-3.1-8b-instant");

        // Unknown values fall back to the default backend.
        let fallback = ProviderConfig::resolve(&test_config("something-else"));
        assert_eq!(fallback.endpoint, GROQ_ENDPOINT);
    }

    #[test]
    fn test_provider_factory_selects_openrouter() {
        let provider = ProviderConfig::resolve(&test_config("openrouter"));
        assert_eq!(provider.endpoint, OPENROUTER_ENDPOINT);
        // Key was never set for this backend: resolution still succeeds and
        // the missing credential surfaces at call time.
        assert!(provider.api_key.is_none());
    }
}
