//! Note domain model.
//!
//! # Responsibility
//! - Define the value types persisted by the note repository.
//! - Define drawing input samples consumed by the file store.
//!
//! # Invariants
//! - `Note::id` and `Note::created_at` never change after construction.
//! - Attachment order is display order.
//! - Models do not validate titles or attachment paths; that belongs to the
//!   use-case layer and the renderer respectively.

pub mod attachment;
pub mod drawing;
pub mod note;
pub mod timestamp;
