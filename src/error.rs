use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Transport error (status {}): {body}", .status.map(|s| s.to_string()).unwrap_or_else(|| "none".into()))]
    Transport { status: Option<u16>, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Generation failed: {} {}", .code.as_deref().unwrap_or("unknown"), .message.as_deref().unwrap_or("no message"))]
    GenerationFailed {
        code: Option<String>,
        message: Option<String>,
    },
    #[error("Timed out waiting for task: {task_id}")]
    GenerationTimeout { task_id: String },
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CardError {
    fn from(e: reqwest::Error) -> Self {
        CardError::Transport {
            status: e.status().map(|s| s.as_u16()),
            body: e.to_string(),
        }
    }
}

impl From<image::ImageError> for CardError {
    fn from(e: image::ImageError) -> Self {
        CardError::ImageDecode(e.to_string())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        CardError::Serialization(e.to_string())
    }
}

impl CardError {
    /// True for the four acquisition failures that end a card's generation attempt.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            CardError::Transport { .. }
                | CardError::MalformedResponse(_)
                | CardError::GenerationFailed { .. }
                | CardError::GenerationTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CardError::GenerationFailed {
            code: Some("DataInspectionFailed".into()),
            message: None,
        };
        assert_eq!(
            err.to_string(),
            "Generation failed: DataInspectionFailed no message"
        );

        let err = CardError::Transport {
            status: Some(401),
            body: "unauthorized".into(),
        };
        assert_eq!(err.to_string(), "Transport error (status 401): unauthorized");

        let err = CardError::GenerationTimeout {
            task_id: "t-1".into(),
        };
        assert!(err.is_acquisition_failure());
        assert!(!CardError::Config("x".into()).is_acquisition_failure());
    }
}
