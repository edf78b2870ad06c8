/// Convenience result type used across typingvid.
pub type TypingResult<T> = Result<T, TypingError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum TypingError {
    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// A keyboard layout could not be found, parsed, or validated.
    #[error("layout error: {0}")]
    Layout(String),

    /// A theme could not be found, parsed, or validated.
    #[error("theme error: {0}")]
    Theme(String),

    /// The input text contains a character the active layout cannot type.
    #[error("unsupported character {ch:?} at position {position} for layout '{layout}'")]
    UnsupportedCharacter {
        /// Offending character.
        ch: char,
        /// 0-based character (not byte) position in the input text.
        position: usize,
        /// Name of the active layout.
        layout: String,
    },

    /// The output path does not name a container we can encode.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Errors while building or rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors reported by a frame sink / video encoder.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TypingError {
    /// Build a [`TypingError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TypingError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`TypingError::Theme`] value.
    pub fn theme(msg: impl Into<String>) -> Self {
        Self::Theme(msg.into())
    }

    /// Build a [`TypingError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`TypingError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TypingError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
