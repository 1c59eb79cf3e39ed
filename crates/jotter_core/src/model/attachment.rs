//! Attachment reference model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque attachment identifier.
pub type AttachmentId = String;

/// Reference from a note to an image or drawing file owned by the file store.
///
/// `path` is not checked for existence here; a dangling path is a
/// rendering-time concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    /// Absolute path under the notes directory.
    pub path: String,
    /// Display name, independent of `path`.
    pub file_name: String,
    /// Always `true` for the kinds produced today.
    pub is_image: bool,
}

impl Attachment {
    /// Creates an image attachment with a fresh id.
    pub fn image(path: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), path, file_name, true)
    }

    /// Creates an attachment with a caller-provided id.
    pub fn with_id(
        id: impl Into<AttachmentId>,
        path: impl Into<String>,
        file_name: impl Into<String>,
        is_image: bool,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            file_name: file_name.into(),
            is_image,
        }
    }
}
