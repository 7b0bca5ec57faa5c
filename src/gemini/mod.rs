pub mod image_client;
pub mod transport;

use crate::error::Result;
use async_trait::async_trait;

pub use image_client::{extract_image, GeminiImageClient};
pub use transport::{ContentTransport, HttpTransport};

/// Anything that can turn a nickname and a style description into an icon
/// data URI.
#[async_trait]
pub trait IconGenerator: Send + Sync {
    async fn generate_icon(&self, nickname: &str, style: &str) -> Result<String>;
}

#[async_trait]
impl IconGenerator for GeminiImageClient {
    async fn generate_icon(&self, nickname: &str, style: &str) -> Result<String> {
        GeminiImageClient::generate_icon(self, nickname, style).await
    }
}
