use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::content::MediaUri;
use crate::model::interaction::scalar_text;

//
// ─── RAW SHAPES (bundle document) ──────────────────────────────────────────────
//

/// `content` of a bundle exercise. Fields of the wrong JSON type read as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawContent {
    pub prompt_text: Option<String>,
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMedia {
    pub url: Option<String>,
}

impl RawContent {
    /// Reads `prompt_text` and `media` (`{"url": ...}` or a bare URL string).
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let media = match value.get("media") {
            Some(Value::String(url)) => Some(RawMedia {
                url: Some(url.clone()),
            }),
            Some(media @ Value::Object(_)) => Some(RawMedia {
                url: media.get("url").and_then(Value::as_str).map(str::to_owned),
            }),
            _ => None,
        };
        Self {
            prompt_text: value.get("prompt_text").and_then(scalar_text),
            media,
        }
    }
}

impl<'de> Deserialize<'de> for RawContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Prompt shown to the learner, with optional media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    prompt_text: String,
    media: Option<MediaUri>,
}

impl Content {
    #[must_use]
    pub fn new(prompt_text: impl Into<String>, media: Option<MediaUri>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            media,
        }
    }

    #[must_use]
    pub fn text_only(prompt_text: impl Into<String>) -> Self {
        Self::new(prompt_text, None)
    }

    /// Normalizes the raw bundle shape. A blank or missing media URL is dropped.
    #[must_use]
    pub fn from_raw(raw: RawContent) -> Self {
        let media = raw
            .media
            .and_then(|m| m.url)
            .and_then(|url| MediaUri::parse(url).ok());
        Self {
            prompt_text: raw.prompt_text.unwrap_or_default().trim().to_owned(),
            media,
        }
    }

    #[must_use]
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    #[must_use]
    pub fn media(&self) -> Option<&MediaUri> {
        self.media.as_ref()
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_trims_prompt_and_keeps_media() {
        let raw: RawContent = serde_json::from_str(
            r#"{"prompt_text": "  Pick one ", "media": {"url": "https://example.org/a.png"}}"#,
        )
        .unwrap();
        let content = Content::from_raw(raw);
        assert_eq!(content.prompt_text(), "Pick one");
        assert!(content.has_media());
    }

    #[test]
    fn blank_media_url_is_dropped() {
        let raw: RawContent =
            serde_json::from_str(r#"{"prompt_text": "Q", "media": {"url": "  "}}"#).unwrap();
        assert!(!Content::from_raw(raw).has_media());
    }

    #[test]
    fn wrongly_typed_fields_read_as_absent() {
        let raw: RawContent =
            serde_json::from_str(r#"{"prompt_text": ["x"], "media": 3}"#).unwrap();
        assert_eq!(raw, RawContent::default());

        let raw: RawContent = serde_json::from_str("null").unwrap();
        assert_eq!(raw, RawContent::default());

        let raw: RawContent =
            serde_json::from_str(r#"{"prompt_text": 12, "media": "clip.mp3"}"#).unwrap();
        let content = Content::from_raw(raw);
        assert_eq!(content.prompt_text(), "12");
        assert!(content.has_media());
    }

    #[test]
    fn missing_prompt_is_empty() {
        let content = Content::from_raw(RawContent::default());
        assert_eq!(content.prompt_text(), "");
        assert!(content.media().is_none());
    }
}
