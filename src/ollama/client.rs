/// Ollama HTTP client implementation.
///
/// This module provides `OllamaClient` for making synchronous HTTP requests
/// to the Ollama API, along with error types and a builder for configuration.
/// The suggestion call sends one image per request to a vision-capable model
/// and returns the raw text reply; it performs no internal retries, so a
/// failed call is final for that image and the caller decides what to do.
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with the Ollama API.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Ollama API-specific errors (malformed or empty responses included)
    #[error("Ollama API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl OllamaError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OllamaError::Timeout(e)
        } else {
            OllamaError::Network(e)
        }
    }
}

/// One message in a `/api/chat` request.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

/// Request body for `/api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

/// Response body for a non-streaming `/api/chat` call.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Builder for constructing `OllamaClient` instances.
///
/// # Examples
///
/// ```
/// use pictag::ollama::OllamaClientBuilder;
///
/// let client = OllamaClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
}

impl OllamaClientBuilder {
    /// Creates a new `OllamaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API.
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL (e.g., "http://localhost:11434")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the `OllamaClient` with the configured settings.
    ///
    /// If `base_url()` was not called, the `OLLAMA_HOST` environment
    /// variable is consulted, then the default `http://localhost:11434`.
    ///
    /// # Errors
    ///
    /// Returns `OllamaError::InvalidUrl` if the resolved URL does not parse,
    /// or `OllamaError::Network` if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<OllamaClient, OllamaError> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string())
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| OllamaError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // Vision models can take a while per image; the request timeout is
        // generous while the connect timeout stays short so an absent server
        // fails fast.
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(OllamaError::Network)?;

        Ok(OllamaClient { client, base_url })
    }
}

/// Synchronous HTTP client for interacting with the Ollama API.
///
/// Constructed via `OllamaClientBuilder`.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

/// Trait for the single-image tag-suggestion call.
///
/// This trait enables mocking in unit tests and keeps the batch pipeline
/// independent of the HTTP layer.
pub trait SuggestionClient: Send + Sync {
    /// Requests tag suggestions for one image.
    ///
    /// # Arguments
    ///
    /// * `model` - The model to use (e.g., "qwen2.5vl:7b")
    /// * `prompt` - The instruction prompt sent with the image
    /// * `image` - The raw image file bytes
    ///
    /// # Returns
    ///
    /// The model's reply text, trimmed. An empty reply is an error, never
    /// an empty string.
    fn suggest(&self, model: &str, prompt: &str, image: &[u8]) -> Result<String, OllamaError>;
}

impl OllamaClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists available models from the Ollama API, sorted by size (largest first).
    ///
    /// Fetches the `/api/tags` endpoint and returns model names.
    pub fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(OllamaError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(OllamaError::Http {
                status: response.status().as_u16(),
            });
        }

        let json: serde_json::Value = response.json().map_err(OllamaError::from_reqwest)?;

        let mut models: Vec<(String, u64)> = json
            .get("models")
            .and_then(|m| m.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|model| {
                        let name = model.get("name").and_then(|n| n.as_str())?;
                        let size = model.get("size").and_then(|s| s.as_u64()).unwrap_or(0);
                        Some((name.to_string(), size))
                    })
                    .collect()
            })
            .unwrap_or_default();

        models.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(models.into_iter().map(|(name, _)| name).collect())
    }

    fn suggest_internal(
        &self,
        model: &str,
        prompt: &str,
        image: &[u8],
    ) -> Result<String, OllamaError> {
        let url = format!("{}/api/chat", self.base_url);
        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
                images: vec![BASE64.encode(image)],
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(OllamaError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OllamaError::Http {
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response.json().map_err(OllamaError::from_reqwest)?;

        let content = reply
            .message
            .map(|m| m.content.trim().to_string())
            .ok_or_else(|| OllamaError::Api {
                message: "Missing 'message' field in API response".to_string(),
            })?;

        if content.is_empty() {
            return Err(OllamaError::Api {
                message: "Model returned an empty response".to_string(),
            });
        }

        Ok(content)
    }
}

impl SuggestionClient for OllamaClient {
    fn suggest(&self, model: &str, prompt: &str, image: &[u8]) -> Result<String, OllamaError> {
        self.suggest_internal(model, prompt, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn http_error_variant_with_status_code() {
        let err = OllamaError::Http { status: 404 };
        let msg = format!("{}", err);
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn api_error_variant_for_ollama_specific_errors() {
        let err = OllamaError::Api {
            message: "Model not found".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Ollama API error"));
        assert!(msg.contains("Model not found"));
    }

    #[test]
    fn builder_sets_custom_url() {
        let builder = OllamaClientBuilder::new().base_url("http://example.com:11434");
        assert_eq!(
            builder.base_url,
            Some("http://example.com:11434".to_string())
        );
    }

    #[test]
    #[serial]
    fn build_uses_default_url_when_base_url_not_called() {
        unsafe {
            std::env::remove_var("OLLAMA_HOST");
        }

        let client = OllamaClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    #[serial]
    fn build_reads_ollama_host_environment_variable_if_set() {
        unsafe {
            std::env::set_var("OLLAMA_HOST", "http://custom-host:11434");
        }

        let client = OllamaClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), "http://custom-host:11434");

        unsafe {
            std::env::remove_var("OLLAMA_HOST");
        }
    }

    #[test]
    #[serial]
    fn builder_value_takes_precedence_over_env_var() {
        unsafe {
            std::env::set_var("OLLAMA_HOST", "http://env-var-host:11434");
        }

        let client = OllamaClientBuilder::new()
            .base_url("http://builder-host:11434")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://builder-host:11434");

        unsafe {
            std::env::remove_var("OLLAMA_HOST");
        }
    }

    #[test]
    fn build_returns_error_if_invalid_url_provided() {
        let result = OllamaClientBuilder::new().base_url("not-a-valid-url").build();
        assert!(matches!(result, Err(OllamaError::InvalidUrl(_))));
    }

    #[test]
    fn chat_request_serializes_image_payload() {
        let request = ChatRequest {
            model: "qwen2.5vl:7b",
            messages: vec![ChatMessage {
                role: "user",
                content: "describe",
                images: vec![BASE64.encode(b"fake image bytes")],
            }],
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen2.5vl:7b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "describe");
        assert_eq!(
            json["messages"][0]["images"][0],
            BASE64.encode(b"fake image bytes")
        );
    }

    #[test]
    fn chat_response_parses_message_content() {
        let json = r#"{"message": {"role": "assistant", "content": "cat, window, sunlight"}}"#;
        let reply: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.message.unwrap().content, "cat, window, sunlight");
    }

    #[test]
    fn chat_response_tolerates_missing_message() {
        let json = r#"{"done": true}"#;
        let reply: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(reply.message.is_none());
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockClient {
            response: String,
        }

        impl SuggestionClient for MockClient {
            fn suggest(
                &self,
                _model: &str,
                _prompt: &str,
                _image: &[u8],
            ) -> Result<String, OllamaError> {
                Ok(self.response.clone())
            }
        }

        let mock = MockClient {
            response: "beach, waves".to_string(),
        };
        let result = mock.suggest("test-model", "prompt", b"bytes");
        assert_eq!(result.unwrap(), "beach, waves");
    }
}
