pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("invalid dimension format: {0:?} (use WIDTH[xHEIGHT][@2x|@3x])")]
    InvalidDimensionFormat(String),

    #[error("image dimensions must be between 10 and 4000, got {width}x{height}")]
    DimensionOutOfRange { width: u64, height: u64 },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("encoding failure: {0}")]
    EncodingFailure(String),
}

impl RenderError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingFailure(msg.into())
    }

    /// Caller-input errors, as opposed to internal ones.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::EncodingFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert!(
            RenderError::InvalidDimensionFormat("abc".to_string())
                .to_string()
                .contains("invalid dimension format")
        );
        assert!(
            RenderError::DimensionOutOfRange {
                width: 5,
                height: 5
            }
            .to_string()
            .contains("5x5")
        );
        assert!(
            RenderError::UnsupportedFormat("bmp".to_string())
                .to_string()
                .contains("bmp")
        );
        assert!(
            RenderError::encoding("boom")
                .to_string()
                .contains("encoding failure: boom")
        );
    }

    #[test]
    fn encoding_is_not_a_client_error() {
        assert!(!RenderError::encoding("x").is_client_error());
        assert!(RenderError::UnsupportedFormat("x".into()).is_client_error());
    }
}
