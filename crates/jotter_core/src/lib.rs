//! Core domain logic for Jotter.
//! This crate is the single source of truth for note storage invariants.

pub mod config;
pub mod db;
pub mod files;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CorruptDataPolicy, StoreConfig};
pub use files::{FileResult, FileStore, FileStoreError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attachment::{Attachment, AttachmentId};
pub use model::drawing::{DrawingRecorder, Point, Rgba, StrokeSample, StrokeStyle};
pub use model::note::{Note, NoteId};
pub use model::timestamp::Timestamp;
pub use prefs::{
    MemoryPreferenceStore, PreferenceStore, PrefsError, PrefsResult, SqlitePreferenceStore,
};
pub use repo::note_repo::{
    decode_notes, encode_notes, NoteRepository, PrefsNoteRepository, RepoError, RepoResult,
};
pub use search::note_search::{search_notes, NoteSearchHit, NoteSearchQuery};
pub use service::note_service::{NoteService, NoteServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
