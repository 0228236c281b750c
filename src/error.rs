//! Error types for the rank card renderer

use thiserror::Error;

/// Result type alias for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering a card
#[derive(Error, Debug)]
pub enum Error {
    /// Avatar or background image could not be fetched
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    /// Fetched bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Malformed color string, empty gradient, or unknown status key
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Nonsensical input data (e.g. a negative XP curve value)
    #[error("Invalid input: {0}")]
    Input(String),

    /// Font file could not be read or parsed
    #[error("Font registration failed: {0}")]
    Font(String),

    /// The finished surface could not be encoded as PNG
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}
