pub mod content;
pub mod media;

pub use content::{Content, RawContent, RawMedia};
pub use media::{MediaUri, MediaValidationError};
