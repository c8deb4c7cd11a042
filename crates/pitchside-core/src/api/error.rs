use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FeedError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build an upstream error from a non-success response.
    ///
    /// The forwarding layer reports `{"error": ...}`, the provider itself
    /// reports `{"message": ...}`. Anything else is kept as raw text.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["error", "message"].iter().find_map(|field| {
                    json.get(field)
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                })
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("no response body")
                        .to_string()
                } else {
                    Self::truncate_body(body)
                }
            });

        FeedError::Upstream {
            status: status.as_u16(),
            message,
        }
    }

    /// Whether trying again later can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Transport(_) => true,
            FeedError::Upstream { status, .. } => *status == 429 || (500..=599).contains(status),
            FeedError::Decode(_) | FeedError::Config(_) => false,
        }
    }

    /// Short message for the status bar.
    pub fn summary(&self) -> String {
        match self {
            FeedError::Transport(_) => "Unable to reach server".to_string(),
            FeedError::Upstream { status: 429, .. } => "Rate limited by provider".to_string(),
            FeedError::Upstream { message, .. } => message.clone(),
            FeedError::Decode(_) => "Malformed response".to_string(),
            FeedError::Config(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Transport(err.to_string())
    }
}
