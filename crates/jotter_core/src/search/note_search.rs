//! In-memory keyword search over a loaded note collection.
//!
//! # Invariants
//! - Blank queries return no hits.
//! - Every whitespace-separated term must match title or content,
//!   case-insensitively.
//! - Hits keep collection order.

use crate::model::note::{Note, NoteId};

const DEFAULT_LIMIT: u32 = 20;
const SNIPPET_CONTEXT_CHARS: usize = 30;
const PREVIEW_CHARS: usize = 60;

/// Search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchQuery {
    pub text: String,
    /// Maximum number of hits; `0` yields none.
    pub limit: u32,
}

impl NoteSearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One matching note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchHit {
    pub note_id: NoteId,
    pub title: String,
    /// Whether any term matched inside the title.
    pub title_matched: bool,
    /// Body excerpt around the first body match, or the body preview.
    pub snippet: Option<String>,
}

/// Searches `notes` and returns ranked-by-storage-order hits.
pub fn search_notes(notes: &[Note], query: &NoteSearchQuery) -> Vec<NoteSearchHit> {
    let terms = query
        .text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    if terms.is_empty() || query.limit == 0 {
        return Vec::new();
    }

    notes
        .iter()
        .filter_map(|note| match_note(note, &terms))
        .take(query.limit as usize)
        .collect()
}

fn match_note(note: &Note, terms: &[String]) -> Option<NoteSearchHit> {
    let title = note.title.to_lowercase();
    let content = note.content.to_lowercase();

    let mut title_matched = false;
    let mut first_content_match: Option<usize> = None;
    for term in terms {
        let in_title = title.contains(term.as_str());
        let in_content = content.find(term.as_str());
        if !in_title && in_content.is_none() {
            return None;
        }
        title_matched |= in_title;
        if let Some(byte_offset) = in_content {
            let char_offset = content[..byte_offset].chars().count();
            first_content_match =
                Some(first_content_match.map_or(char_offset, |current| current.min(char_offset)));
        }
    }

    let snippet = match first_content_match {
        Some(offset) => Some(excerpt(&note.content, offset)),
        None => note.preview(PREVIEW_CHARS),
    };

    Some(NoteSearchHit {
        note_id: note.id.clone(),
        title: note.title.clone(),
        title_matched,
        snippet,
    })
}

// `offset` is a char index into the lowercased body. Lowercasing can change
// char counts for a few scripts; the excerpt is then only approximately
// centered, which is fine for display.
fn excerpt(content: &str, offset: usize) -> String {
    let chars = content.chars().collect::<Vec<_>>();
    let start = offset.saturating_sub(SNIPPET_CONTEXT_CHARS).min(chars.len());
    let end = (offset + SNIPPET_CONTEXT_CHARS * 2).min(chars.len());
    let body = chars[start..end]
        .iter()
        .map(|c| if c.is_whitespace() { ' ' } else { *c })
        .collect::<String>();

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(body.trim());
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}
