//! Note search entry points.
//!
//! # Responsibility
//! - Match notes against free-text queries typed in the search bar.
//! - Keep result shaping (snippets, limits) inside core.

pub mod note_search;
