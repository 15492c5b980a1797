//! The locally owned service record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use zoo_product_form_core::ServiceId;

/// A catalog service (the source of truth for its metaobject mirror).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Store-assigned ID, immutable.
    pub id: ServiceId,
    /// Display title, never blank.
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Shopify metaobject GID, set the first time a mirror write succeeds.
    pub remote_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input rejected before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Form field the error belongs to.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// Validated field set for creating or updating a service.
///
/// The only way to build one is [`ServiceDraft::new`], so a blank title can
/// never reach the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    title: String,
    description: Option<String>,
    image_url: Option<String>,
}

impl ServiceDraft {
    /// Validate raw form input.
    ///
    /// The title is trimmed and must be non-empty. Blank optional fields are
    /// normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing or whitespace-only title.
    pub fn new(
        title: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError {
                field: "title",
                message: "Title is required".to_string(),
            });
        }

        Ok(Self {
            title: title.to_string(),
            description: non_blank(description),
            image_url: non_blank(image_url),
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_rejects_empty_title() {
        let err = ServiceDraft::new("", None, None).unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.to_string(), "title: Title is required");
    }

    #[test]
    fn test_draft_rejects_whitespace_title() {
        assert!(ServiceDraft::new(" \t\n ", Some("desc"), None).is_err());
    }

    #[test]
    fn test_draft_trims_title() {
        let draft = ServiceDraft::new("  Feeding tour ", None, None).unwrap();
        assert_eq!(draft.title(), "Feeding tour");
    }

    #[test]
    fn test_draft_blank_optionals_become_none() {
        let draft = ServiceDraft::new("Safari", Some("   "), Some("")).unwrap();
        assert_eq!(draft.description(), None);
        assert_eq!(draft.image_url(), None);
    }

    #[test]
    fn test_draft_keeps_optionals() {
        let draft = ServiceDraft::new(
            "Safari",
            Some("Half-day jeep tour"),
            Some("https://cdn.example.com/safari.jpg"),
        )
        .unwrap();
        assert_eq!(draft.description(), Some("Half-day jeep tour"));
        assert_eq!(draft.image_url(), Some("https://cdn.example.com/safari.jpg"));
    }
}
