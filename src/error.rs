use thiserror::Error;

/// Terminal failures of a single generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Prompt is required")]
    InvalidRequest,

    #[error("GEMINI_API_KEY missing in .env")]
    Configuration,

    #[error("Gemini API error: {0}")]
    Upstream(String),

    #[error("AI response is not valid JSON: {reason}")]
    MalformedResponse { raw: String, reason: String },
}

impl GenerationError {
    pub fn upstream(message: impl Into<String>) -> Self {
        GenerationError::Upstream(message.into())
    }

    pub fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        GenerationError::MalformedResponse {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Upstream(format!("request to model provider timed out: {}", err))
        } else {
            GenerationError::Upstream(err.to_string())
        }
    }
}
