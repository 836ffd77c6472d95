//! Evidence payloads: images and the bundle sent to the verifier.

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ActionType;
use crate::infra::{EcoError, Result};

/// Media type assumed when a data URI omits one.
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// A decoded evidence image: raw bytes plus declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceImage {
    #[serde(with = "bytes_base64")]
    pub data: Vec<u8>,
    pub media_type: String,
}

impl EvidenceImage {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Decode a `data:image/png;base64,...` style URI, or bare base64 with
    /// the default media type.
    pub fn from_data_uri(input: &str) -> Result<Self> {
        let (media_type, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    EcoError::Validation("data URI missing ',' separator".to_string())
                })?;
                let media_type = header
                    .split(';')
                    .next()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_IMAGE_MEDIA_TYPE);
                (media_type.to_string(), payload)
            }
            None => (DEFAULT_IMAGE_MEDIA_TYPE.to_string(), input),
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| EcoError::Validation(format!("invalid image encoding: {e}")))?;

        if data.is_empty() {
            return Err(EcoError::Validation("image payload is empty".to_string()));
        }

        Ok(Self { data, media_type })
    }

    /// Re-encode for transport to the oracle.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Everything the verifier sees about one submission.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    pub action_type: ActionType,
    pub description: String,
    pub location: Option<String>,
    pub action_date: Option<String>,
    pub estimated_impact: Option<String>,
    pub images: Vec<EvidenceImage>,
}

mod bytes_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_data_uri() {
        let img = EvidenceImage::from_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(img.media_type, "image/png");
        assert_eq!(img.data, b"hello");
    }

    #[test]
    fn bare_base64_gets_default_media_type() {
        let img = EvidenceImage::from_data_uri("aGVsbG8=").unwrap();
        assert_eq!(img.media_type, DEFAULT_IMAGE_MEDIA_TYPE);
    }

    #[test]
    fn data_uri_without_media_type_gets_default() {
        let img = EvidenceImage::from_data_uri("data:;base64,aGVsbG8=").unwrap();
        assert_eq!(img.media_type, DEFAULT_IMAGE_MEDIA_TYPE);
    }

    #[test]
    fn rejects_garbage_encoding() {
        assert!(EvidenceImage::from_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(EvidenceImage::from_data_uri("data:image/png;base64,").is_err());
    }
}
