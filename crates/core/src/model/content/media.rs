use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    #[error("Media URI cannot be empty.")]
    EmptyMediaUri,
}

//
// ─── MEDIA URI ─────────────────────────────────────────────────────────────────
//

/// Location of the media attached to an exercise prompt.
///
/// Absolute URLs (`https://`, `data:`) are kept as `Url`; anything else is treated
/// as a path relative to the bundle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaUri {
    FilePath(PathBuf),
    Url(Url),
}

impl MediaUri {
    /// Parses a raw `media.url` value.
    ///
    /// # Errors
    ///
    /// Returns `MediaValidationError::EmptyMediaUri` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        match Url::parse(s) {
            Ok(url) => Ok(MediaUri::Url(url)),
            Err(_) => Ok(MediaUri::FilePath(PathBuf::from(s))),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            MediaUri::FilePath(p) => Some(p.as_path()),
            MediaUri::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaUri::Url(u) => Some(u),
            MediaUri::FilePath(_) => None,
        }
    }

    /// String form suitable for a presentation layer.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            MediaUri::FilePath(p) => p.display().to_string(),
            MediaUri::Url(u) => u.to_string(),
        }
    }
}
