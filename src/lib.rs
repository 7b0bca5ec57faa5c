//! Turn a gamer nickname into a stylized avatar icon.
//!
//! [`GeminiImageClient`] talks to the Gemini image API, [`IconSession`] drives
//! one generation at a time and holds the form state shown to the user.

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod session;

pub use config::{Config, GeminiConfig};
pub use error::{IconError, Result};
pub use gemini::{ContentTransport, GeminiImageClient, HttpTransport, IconGenerator};
pub use models::{download_filename, GenerationRequest, Style, STYLES};
pub use session::{Dispatch, GenerationStatus, IconSession, UiState};
