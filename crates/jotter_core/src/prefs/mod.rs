//! Key-value preference storage.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued store the note repository
//!   persists into.
//! - Provide a SQLite-backed store and an in-process store.
//!
//! # Invariants
//! - `set_string` replaces the whole value in a single write.
//! - A missing key reads as `None`, never as an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryPreferenceStore;
pub use sqlite::SqlitePreferenceStore;

pub type PrefsResult<T> = Result<T, PrefsError>;

#[derive(Debug)]
pub enum PrefsError {
    Db(DbError),
    /// Backing store cannot serve requests (e.g. poisoned or closed).
    Unavailable(String),
}

impl Display for PrefsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "preference store unavailable: {message}"),
        }
    }
}

impl Error for PrefsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PrefsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PrefsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed preference storage.
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> PrefsResult<Option<String>>;
    fn set_string(&self, key: &str, value: &str) -> PrefsResult<()>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> PrefsResult<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn get_string(&self, key: &str) -> PrefsResult<Option<String>> {
        (**self).get_string(key)
    }

    fn set_string(&self, key: &str, value: &str) -> PrefsResult<()> {
        (**self).set_string(key, value)
    }

    fn remove(&self, key: &str) -> PrefsResult<()> {
        (**self).remove(key)
    }
}
