//! Error types shared across HandsOff crates.

/// Top-level error type for HandsOff operations.
///
/// A missing person in frame is not represented here: it is an ordinary
/// `None` from the landmark source and drives the detector back to `Normal`.
#[derive(Debug, thiserror::Error)]
pub enum HandsoffError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Camera or pose model could not be opened. Fatal to the process.
    #[error("Source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// A frame could not be read; the stream is considered ended.
    #[error("Frame read error: {message}")]
    FrameRead { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("Statistics error: {message}")]
    Stats { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HandsoffError.
pub type HandsoffResult<T> = Result<T, HandsoffError>;

impl HandsoffError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn frame_read(msg: impl Into<String>) -> Self {
        Self::FrameRead {
            message: msg.into(),
        }
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image {
            message: msg.into(),
        }
    }

    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report {
            message: msg.into(),
        }
    }

    pub fn stats(msg: impl Into<String>) -> Self {
        Self::Stats {
            message: msg.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    /// Whether this error should stop the process rather than end a stream.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unavailable_is_fatal() {
        assert!(HandsoffError::source_unavailable("no camera").is_fatal());
        assert!(!HandsoffError::frame_read("eof").is_fatal());
        assert!(!HandsoffError::config("bad").is_fatal());
    }

    #[test]
    fn display_includes_message() {
        let err = HandsoffError::stats("week offset out of range");
        assert_eq!(err.to_string(), "Statistics error: week offset out of range");
    }
}
