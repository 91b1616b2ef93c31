//! Anthropic Messages API client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::schema::LlmConfig;

use super::{ContentGenerator, GenerationPrompt, GeneratorError, GeneratorResponse, Usage};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicGenerator {
    client: Client,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    endpoint: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicGenerator {
    pub fn new(api_key: SecretString, config: &LlmConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeneratorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ContentGenerator for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn generate(&self, prompt: &GenerationPrompt) -> Result<GeneratorResponse, GeneratorError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &prompt.system,
            messages: vec![Message {
                role: "user",
                content: &prompt.text,
            }],
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Calling Messages API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status, retry_after, &body));
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| GeneratorError::Malformed(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(GeneratorError::Empty);
        }

        Ok(GeneratorResponse {
            text,
            usage: parsed.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}

/// Maps a failure to get any response at all.
///
/// Timeouts and connection or transport failures are transient. A bad
/// endpoint URL or other request-building problem will not fix itself.
pub fn classify_send_error(err: &reqwest::Error) -> GeneratorError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        GeneratorError::Transient(err.to_string())
    } else {
        GeneratorError::Client(err.to_string())
    }
}

/// Maps a non-success HTTP status to a generator error.
///
/// 429 and 529 (overloaded) are rate limits, other 5xx are transient.
pub fn classify_status(
    status: StatusCode,
    retry_after_secs: Option<u64>,
    body: &str,
) -> GeneratorError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 529 {
        return GeneratorError::RateLimited { retry_after_secs };
    }

    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status.is_server_error() {
        GeneratorError::Transient(format!("HTTP {}: {}", status.as_u16(), message))
    } else {
        GeneratorError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serp::{DensityRange, MockSerpSource, SerpAnalyzer, SerpSource};

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, Some(12), "");
        assert!(matches!(
            err,
            GeneratorError::RateLimited {
                retry_after_secs: Some(12)
            }
        ));

        let overloaded = StatusCode::from_u16(529).unwrap();
        assert!(matches!(
            classify_status(overloaded, None, ""),
            GeneratorError::RateLimited { .. }
        ));
    }

    #[test]
    fn test_classify_server_error_is_transient() {
        let err = classify_status(StatusCode::BAD_GATEWAY, None, "upstream down");
        match err {
            GeneratorError::Transient(msg) => assert_eq!(msg, "HTTP 502: upstream down"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_client_error_extracts_message() {
        let body = r#"{"type":"error","error":{"message":"max_tokens too large"}}"#;
        match classify_status(StatusCode::BAD_REQUEST, None, body) {
            GeneratorError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "max_tokens too large");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_new_uses_config() {
        let config = LlmConfig {
            model: "claude-test".into(),
            ..LlmConfig::default()
        };
        let generator =
            AnthropicGenerator::new(SecretString::from("sk-test".to_string()), &config).unwrap();
        assert_eq!(generator.model(), "claude-test");
        assert_eq!(generator.name(), "anthropic");
    }

    fn generator_at(endpoint: &str) -> AnthropicGenerator {
        let config = LlmConfig {
            endpoint: endpoint.into(),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        AnthropicGenerator::new(SecretString::from("sk-test".to_string()), &config).unwrap()
    }

    fn prompt() -> GenerationPrompt {
        let data = MockSerpSource::default().fetch("remote work").unwrap();
        let analysis = SerpAnalyzer::new(DensityRange::new(1.0, 3.0)).analyze(data);
        crate::generator::build_prompt("remote work", "en", 500, &analysis)
    }

    #[test]
    fn test_bad_endpoint_is_not_transient() {
        let err = generator_at("not a url").generate(&prompt()).unwrap_err();
        assert!(matches!(err, GeneratorError::Client(_)), "{:?}", err);
    }

    #[test]
    fn test_refused_connection_is_transient() {
        let err = generator_at("http://127.0.0.1:1/v1/messages")
            .generate(&prompt())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Transient(_)), "{:?}", err);
    }
}
