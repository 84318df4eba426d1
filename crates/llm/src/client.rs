use async_trait::async_trait;
use listingsmith_common::{AppConfig, ListingSmithError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm_trait::CompletionClient;
use crate::normalize::normalize_text;
use crate::types::{ChatMessage, ChatRequest, ProviderReply};

/// OpenRouter (OpenAI-compatible) chat completion client
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Create new client from application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ListingSmithError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "LLM client initialized: {} (model: {})",
            config.llm_base_url, config.llm_model
        );

        Ok(Self {
            client,
            endpoint: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.llm_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    fn build_request(&self, system: &str, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            max_tokens: Some(self.max_tokens),
            stream: false,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ListingSmithError {
        if e.is_timeout() {
            ListingSmithError::provider(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else if e.is_connect() {
            ListingSmithError::provider(format!("could not connect to {}: {}", self.endpoint, e))
        } else {
            ListingSmithError::provider(format!("request failed: {}", e))
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    /// Single request, no retry
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = self.build_request(system, prompt);

        debug!(
            "Sending completion request - Model: {}, Prompt length: {}",
            request.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        let text = classify_response(status, &body)?;
        debug!("Received completion - Length: {} chars", text.len());

        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Turn a raw status + body into completion text or a classified error
pub fn classify_response(status: u16, body: &str) -> Result<String> {
    let reply = serde_json::from_str::<ProviderReply>(body);

    if !(200..300).contains(&status) {
        let message = match &reply {
            Ok(ProviderReply::Failure(envelope)) if !envelope.error.message.is_empty() => {
                envelope.error.message.clone()
            }
            _ => snippet(body),
        };
        warn!("Provider returned {}: {}", status, message);
        return Err(error_for_status(status, message));
    }

    match reply {
        Ok(ProviderReply::Success(response)) => {
            if let Some(usage) = &response.usage {
                debug!(
                    "Token usage: prompt={}, completion={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            if response.choices.is_empty() {
                return Err(ListingSmithError::provider("no choices returned"));
            }

            let text = response.text().map(normalize_text).unwrap_or_default();
            if text.is_empty() {
                return Err(ListingSmithError::provider("empty response content"));
            }

            Ok(text)
        }
        Ok(ProviderReply::Failure(envelope)) => {
            let code = envelope.error.status().unwrap_or(500);
            warn!("Provider error in {} body: {}", status, envelope.error.message);
            Err(error_for_status(code, envelope.error.message))
        }
        Err(e) => Err(ListingSmithError::provider(format!(
            "undecodable response ({}): {}",
            e,
            snippet(body)
        ))),
    }
}

fn error_for_status(status: u16, message: String) -> ListingSmithError {
    match status {
        401 | 403 => ListingSmithError::auth(format!("{} ({})", message, status)),
        429 => ListingSmithError::rate_limit(message),
        _ => ListingSmithError::provider(format!("status {}: {}", status, message)),
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
