use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name (e.g., "deepseek/deepseek-chat")
    pub model: String,

    /// Conversation, system message first
    pub messages: Vec<ChatMessage>,

    /// Temperature (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Always false; one request, one response
    pub stream: bool,
}

/// Single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Successful chat completion payload
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Model that served the request
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice, if any
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,
}

/// Provider error body, sometimes returned with a 2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,

    /// Numeric HTTP-like code or a string code, depending on the provider
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Numeric code when the provider sent one
    pub fn status(&self) -> Option<u16> {
        match &self.code {
            Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Decoded provider response body
///
/// Downstream code branches on this instead of on raw status text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderReply {
    Failure(ErrorEnvelope),
    Success(ChatResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "deepseek/deepseek-chat".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
            temperature: Some(0.7),
            top_p: None,
            max_tokens: Some(2048),
            stream: false,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "deepseek/deepseek-chat");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 2048);
        assert_eq!(value["stream"], false);
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_reply_decodes_success_and_failure() {
        let ok: ProviderReply = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":"hi"}}]}"#,
        )
        .unwrap();
        match ok {
            ProviderReply::Success(resp) => assert_eq!(resp.text(), Some("hi")),
            other => panic!("unexpected {other:?}"),
        }

        let err: ProviderReply =
            serde_json::from_str(r#"{"error":{"message":"No auth credentials found","code":401}}"#)
                .unwrap();
        match err {
            ProviderReply::Failure(envelope) => {
                assert_eq!(envelope.error.status(), Some(401));
                assert_eq!(envelope.error.message, "No auth credentials found");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
