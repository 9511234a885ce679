//! Record types for the creation flow
//!
//! The draft is a strongly-typed replacement for a loose field-name → value
//! map: every field the creation form carries is an explicit, owned value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A city draft under construction in a form session
///
/// Created empty when a session opens, mutated field-by-field, and
/// discarded when the session closes. The `slug` field tracks `name`
/// through [`crate::slug::derive_slug`] until it is manually overridden
/// for the rest of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDraft {
    /// Display name of the city
    pub name: String,

    /// URL-safe identifier derived from `name` (or manually set)
    pub slug: String,

    /// Identifier of the selected reference entity (e.g., a country id),
    /// kept as a string exactly as it will be sent
    pub reference_id: String,

    /// Free-form description (optional, defaults to empty)
    pub description: String,

    /// Attached images; only the first is submitted
    pub images: Vec<ImageAttachment>,
}

/// An image attached to a draft
///
/// Carries the bytes along with the metadata needed to build a multipart
/// file part.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Original file name (e.g., "kyiv.jpg")
    pub file_name: String,

    /// MIME type of the content (e.g., "image/jpeg")
    pub content_type: String,

    /// Raw file content
    pub bytes: Vec<u8>,
}

// Debug skips the raw bytes; attachments can be megabytes
impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// One selectable entry of a reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOption {
    /// Backend identifier, kept as a string
    pub id: String,

    /// Human-readable label
    pub label: String,
}

/// Protocol-ready payload for one creation request
///
/// Built by the session from a validated draft; field names match the
/// multipart part names the backend expects.
#[derive(Debug, Clone)]
pub struct NewEntityPayload {
    /// Value of the `Name` part
    pub name: String,

    /// Value of the `Slug` part
    pub slug: String,

    /// Value of the `Description` part
    pub description: String,

    /// Wire name of the reference part (e.g., "CountryId")
    pub reference_field: String,

    /// Value of the reference part
    pub reference_id: String,

    /// Binary `Image` part (first attachment only)
    pub image: ImageAttachment,
}

/// Representation of a created entity, as far as the backend reported one
///
/// A 2xx response is a success even when the body carries no usable
/// representation, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    /// Backend identifier of the created entity
    #[serde(default)]
    pub id: Option<i64>,

    /// Echoed display name
    #[serde(default)]
    pub name: Option<String>,

    /// Echoed slug
    #[serde(default)]
    pub slug: Option<String>,
}

/// Outcome of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The entity was created; navigate to the listing route
    Success {
        /// Route the caller should navigate to
        redirect: String,
    },

    /// The request failed; the draft is untouched and can be retried
    Failure {
        /// Description of the underlying error
        reason: String,
    },
}

impl SubmissionOutcome {
    /// Whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }
}

/// A session's record of its last completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// The outcome of the attempt
    pub outcome: SubmissionOutcome,

    /// When the attempt completed
    pub completed_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub(crate) fn new(outcome: SubmissionOutcome) -> Self {
        Self {
            outcome,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_debug_hides_bytes() {
        let attachment = ImageAttachment {
            file_name: "kyiv.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF; 1024],
        };

        let debug = format!("{:?}", attachment);
        assert!(debug.contains("kyiv.jpg"));
        assert!(debug.contains("<1024 bytes>"));
        assert!(!debug.contains("255, 255"));
    }

    #[test]
    fn created_entity_tolerates_missing_fields() {
        let entity: CreatedEntity = serde_json::from_str("{}").unwrap();
        assert_eq!(entity, CreatedEntity::default());

        let entity: CreatedEntity =
            serde_json::from_str(r#"{"id": 5, "name": "Kyiv", "extra": true}"#).unwrap();
        assert_eq!(entity.id, Some(5));
        assert_eq!(entity.name.as_deref(), Some("Kyiv"));
    }
}
