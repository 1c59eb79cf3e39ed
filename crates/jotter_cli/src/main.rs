//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `jotter_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use jotter_core::db::open_db_in_memory;
use jotter_core::{Note, NoteRepository, PrefsNoteRepository, SqlitePreferenceStore};

fn main() {
    println!("jotter_core ping={}", jotter_core::ping());
    println!("jotter_core version={}", jotter_core::core_version());
    println!("jotter_core storage_roundtrip={}", storage_roundtrip());
}

// Exercises SQLite bootstrap and the note codec without touching disk.
fn storage_roundtrip() -> &'static str {
    let Ok(conn) = open_db_in_memory() else {
        return "db_open_failed";
    };
    let repo = PrefsNoteRepository::new(SqlitePreferenceStore::new(&conn));
    let note = Note::new("smoke check", "", Vec::new());
    if repo.add(&note).is_err() {
        return "write_failed";
    }
    match repo.load_all() {
        Ok(notes) if notes == vec![note] => "ok",
        Ok(_) => "mismatch",
        Err(_) => "read_failed",
    }
}
