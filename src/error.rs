use thiserror::Error;

/// Shown when an error carries no description of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while generating the image.";

pub const NO_IMAGE_MESSAGE: &str =
    "Could not generate an image for this nickname. Please try a different nickname.";

#[derive(Debug, Error)]
pub enum IconError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Generation blocked by the API: {0}")]
    SafetyBlocked(String),
    #[error("The API answered with text instead of an image: {0}")]
    TextOnlyResponse(String),
    #[error("The API returned no result.")]
    EmptyResult,
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImage,
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Response error: {0}")]
    ResponseError(String),
}

impl IconError {
    /// Text rendered to the user in place of the icon. Errors whose
    /// description is blank fall back to [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<serde_json::Error> for IconError {
    fn from(e: serde_json::Error) -> Self {
        IconError::ResponseError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IconError>;
