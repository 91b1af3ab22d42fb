/// Ollama HTTP client module.
///
/// This module provides a synchronous HTTP client for the Ollama API,
/// including the vision-chat request used for tag suggestion, error types,
/// and builder patterns for configuration.
mod client;

pub use client::{OllamaClient, OllamaClientBuilder, OllamaError, SuggestionClient};
