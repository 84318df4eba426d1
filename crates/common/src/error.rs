/// ListingSmith error types
#[derive(Debug, thiserror::Error)]
pub enum ListingSmithError {
    /// Input listing is missing a key or carries a bad value
    #[error("Validation error: '{key}' {reason}")]
    Validation { key: String, reason: String },

    /// Configuration error (missing credential, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider rejected the credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Provider backpressure, safe to retry after a delay
    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// Any other provider failure (non-2xx, bad response shape, timeout)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model output did not contain all seven sections
    #[error("Incomplete generation: missing section(s) {}", .missing.join(", "))]
    IncompleteGeneration { missing: Vec<String> },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ListingSmithError {
    /// Create validation error for a dotted key path
    pub fn validation<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create auth error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Create rate limit error
    pub fn rate_limit<S: Into<String>>(msg: S) -> Self {
        Self::RateLimit(msg.into())
    }

    /// Create provider error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::Provider(msg.into())
    }

    /// Create incomplete generation error from section names
    pub fn incomplete<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::IncompleteGeneration {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a later attempt may succeed without user action
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }
}

// Process exit status per error class
impl ListingSmithError {
    /// Get process exit code (never 0)
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation { .. } => 2,
            Self::Json(_) => 2,
            Self::Config(_) => 3,
            Self::Auth(_) => 4,
            Self::RateLimit(_) => 5,
            Self::Provider(_) => 6,
            Self::IncompleteGeneration { .. } => 7,
            Self::Io(_) => 8,
            Self::Other(_) => 1,
        }
    }
}
