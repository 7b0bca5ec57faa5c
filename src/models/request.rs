use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{IconError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub attempt_id: String,
    pub nickname: String,
    pub style_description: String,
}

impl GenerationRequest {
    /// Builds a request, rejecting an empty nickname or style.
    pub fn new(nickname: &str, style_description: &str) -> Result<Self> {
        if nickname.is_empty() {
            return Err(IconError::ValidationError(
                "A nickname is required to generate an icon.".into(),
            ));
        }
        if style_description.is_empty() {
            return Err(IconError::ValidationError(
                "A style is required to generate an icon.".into(),
            ));
        }

        Ok(Self {
            attempt_id: Uuid::new_v4().to_string(),
            nickname: nickname.to_string(),
            style_description: style_description.to_string(),
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "An epic, high-resolution avatar icon for a gamer, with the nickname '{}' \
             creatively and artistically stylized as the centerpiece. Visual style: {}. \
             Detailed, vibrant, polished digital art, ideal for a gaming profile.",
            self.nickname, self.style_description
        )
    }
}

/// Download filename for a nickname: `icone_<slug>.png`, whitespace runs
/// collapsed to `_`, `gamer` when nothing is left.
pub fn download_filename(nickname: &str) -> String {
    let slug = nickname.split_whitespace().collect::<Vec<_>>().join("_");
    if slug.is_empty() {
        "icone_gamer.png".to_string()
    } else {
        format!("icone_{}.png", slug)
    }
}

/// Splits a `data:<mime>;base64,<payload>` URI and decodes the payload.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| IconError::ResponseError("Not a data URI".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| IconError::ResponseError("Data URI is not base64 encoded".into()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| IconError::ResponseError(format!("Invalid image payload: {}", e)))?;

    Ok((mime.to_string(), bytes))
}
