//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its wire shape.
//! - Provide copy-construction helpers that keep identity stable.
//!
//! # Invariants
//! - `id` and `created_at` are carried over by every helper unchanged.
//! - Helpers that change title, content or attachments stamp `updated_at`.
//! - `updated_at` is serialized as explicit `null` when absent.

use crate::model::attachment::Attachment;
use crate::model::timestamp::{self, Timestamp};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Opaque note identifier.
///
/// Kept as a string alias: stored collections may carry ids produced by
/// older generators.
pub type NoteId = String;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free text body, may be empty.
    pub content: String,
    #[serde(with = "timestamp::iso8601")]
    pub created_at: Timestamp,
    #[serde(with = "timestamp::iso8601_option", default)]
    pub updated_at: Option<Timestamp>,
    /// Display order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Note {
    /// Creates a note with a generated id and `created_at = now`.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        let mut note = Self::with_id(Uuid::new_v4().to_string(), title, content, Utc::now());
        note.attachments = attachments;
        note
    }

    /// Creates a note with caller-provided identity.
    ///
    /// Used by import paths and tests where id and creation time already exist.
    pub fn with_id(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created_at,
            updated_at: None,
            attachments: Vec::new(),
        }
    }

    /// Returns an edited copy that keeps `id` and `created_at`.
    pub fn edited(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        attachments: Vec<Attachment>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            content: content.into(),
            created_at: self.created_at,
            updated_at: Some(now),
            attachments,
        }
    }

    /// Whether the title has visible characters.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Last modification time, falling back to creation time.
    pub fn last_modified(&self) -> Timestamp {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Single-line body excerpt for list tiles.
    ///
    /// Whitespace runs collapse to one space; at most `max_chars` characters
    /// are kept. Returns `None` for blank bodies.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        let normalized = WHITESPACE_RE.replace_all(&self.content, " ");
        let trimmed = normalized.trim();
        if trimmed.is_empty() || max_chars == 0 {
            return None;
        }
        Some(trimmed.chars().take(max_chars).collect())
    }
}
