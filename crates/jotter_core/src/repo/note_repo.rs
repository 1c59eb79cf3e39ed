//! Note collection persisted as one JSON value in a preference store.
//!
//! # Responsibility
//! - Encode/decode the full note collection under a single storage key.
//! - Implement add/update/remove as read-modify-write over the collection.
//! - Apply the configured policy when the stored value cannot be read or
//!   decoded.
//!
//! # Invariants
//! - `save_all` issues exactly one `set_string` call.
//! - `update`/`remove` that match nothing do not write.
//! - Under `Discard`/`Backup` an unreadable or undecodable value loads as an
//!   empty collection; a following mutation starts from that empty state.
//! - A backed-up value never overwrites an earlier backup.
//! - Relative order of untouched notes is preserved by every mutation.
//! - Not safe for concurrent writers: two overlapping mutations race and one
//!   side is lost. Callers must serialize mutations per storage key.

use crate::config::{CorruptDataPolicy, StoreConfig};
use crate::model::note::Note;
use crate::prefs::{PreferenceStore, PrefsError};
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Prefs(PrefsError),
    Encode(serde_json::Error),
    /// Stored value is not a valid note collection (only with
    /// `CorruptDataPolicy::Fail`).
    Corrupt {
        key: String,
        message: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefs(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Corrupt { key, message } => {
                write!(f, "stored notes under `{key}` are corrupt: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Prefs(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Corrupt { .. } => None,
        }
    }
}

impl From<PrefsError> for RepoError {
    fn from(value: PrefsError) -> Self {
        Self::Prefs(value)
    }
}

/// Whole-collection note persistence contract.
pub trait NoteRepository {
    /// Loads every stored note in storage order. Never-written → empty.
    fn load_all(&self) -> RepoResult<Vec<Note>>;
    /// Replaces the stored collection with `notes`.
    fn save_all(&self, notes: &[Note]) -> RepoResult<()>;
    /// Appends one note.
    fn add(&self, note: &Note) -> RepoResult<()>;
    /// Replaces the first note with the same id. Returns `false` (and writes
    /// nothing) when no id matches.
    fn update(&self, note: &Note) -> RepoResult<bool>;
    /// Drops every note with `id`. Returns how many were removed.
    fn remove(&self, id: &str) -> RepoResult<usize>;

    /// Finds the first note with `id`.
    fn get(&self, id: &str) -> RepoResult<Option<Note>> {
        Ok(self.load_all()?.into_iter().find(|note| note.id == id))
    }
}

/// Note repository over any [`PreferenceStore`].
pub struct PrefsNoteRepository<S: PreferenceStore> {
    store: S,
    storage_key: String,
    backup_key: String,
    policy: CorruptDataPolicy,
}

/// Upper bound on numbered backup slots tried for a free key.
const MAX_BACKUP_SLOTS: u32 = 1000;

impl<S: PreferenceStore> PrefsNoteRepository<S> {
    /// Uses the default storage key and corrupt-data policy.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &StoreConfig::default())
    }

    pub fn with_config(store: S, config: &StoreConfig) -> Self {
        Self {
            store,
            storage_key: config.storage_key.clone(),
            backup_key: config.corrupt_backup_key(),
            policy: config.corrupt_data_policy,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn recover_unreadable(&self, err: PrefsError) -> RepoResult<Vec<Note>> {
        if self.policy == CorruptDataPolicy::Fail {
            error!(
                "event=notes_load module=repo status=error key={} error_code=read_failed error={}",
                self.storage_key, err
            );
            return Err(err.into());
        }
        warn!(
            "event=notes_load module=repo status=read_failed key={} policy={:?} error={}",
            self.storage_key, self.policy, err
        );
        Ok(Vec::new())
    }

    fn recover_corrupt(&self, raw: &str, err: serde_json::Error) -> RepoResult<Vec<Note>> {
        match self.policy {
            CorruptDataPolicy::Discard => {
                warn!(
                    "event=notes_load module=repo status=discarded key={} raw_len={} error={}",
                    self.storage_key,
                    raw.len(),
                    err
                );
                Ok(Vec::new())
            }
            CorruptDataPolicy::Backup => {
                let backup_key = match self.back_up(raw) {
                    Ok(backup_key) => backup_key,
                    Err(backup_err) => {
                        error!(
                            "event=notes_load module=repo status=error key={} error_code=backup_failed error={}",
                            self.storage_key, backup_err
                        );
                        return Err(backup_err);
                    }
                };
                warn!(
                    "event=notes_load module=repo status=backed_up key={} backup_key={} raw_len={} error={}",
                    self.storage_key,
                    backup_key,
                    raw.len(),
                    err
                );
                Ok(Vec::new())
            }
            CorruptDataPolicy::Fail => {
                error!(
                    "event=notes_load module=repo status=error key={} error_code=corrupt raw_len={}",
                    self.storage_key,
                    raw.len()
                );
                Err(RepoError::Corrupt {
                    key: self.storage_key.clone(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Moves `raw` into the first free backup slot and clears the primary key,
    /// so later loads neither re-copy nor clobber it.
    fn back_up(&self, raw: &str) -> RepoResult<String> {
        let backup_key = self.free_backup_key()?;
        self.store.set_string(&backup_key, raw)?;
        self.store.remove(&self.storage_key)?;
        Ok(backup_key)
    }

    // `<key>.corrupt`, then `<key>.corrupt.1`, `<key>.corrupt.2`, ...
    fn free_backup_key(&self) -> RepoResult<String> {
        if self.store.get_string(&self.backup_key)?.is_none() {
            return Ok(self.backup_key.clone());
        }
        for slot in 1..=MAX_BACKUP_SLOTS {
            let candidate = format!("{}.{slot}", self.backup_key);
            if self.store.get_string(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(RepoError::Corrupt {
            key: self.storage_key.clone(),
            message: format!("no free backup slot under `{}`", self.backup_key),
        })
    }
}

impl<S: PreferenceStore> NoteRepository for PrefsNoteRepository<S> {
    fn load_all(&self) -> RepoResult<Vec<Note>> {
        let raw = match self.store.get_string(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => return self.recover_unreadable(err),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match decode_notes(&raw) {
            Ok(notes) => {
                debug!(
                    "event=notes_load module=repo status=ok count={}",
                    notes.len()
                );
                Ok(notes)
            }
            Err(err) => self.recover_corrupt(&raw, err),
        }
    }

    fn save_all(&self, notes: &[Note]) -> RepoResult<()> {
        let encoded = encode_notes(notes).map_err(RepoError::Encode)?;
        if let Err(err) = self.store.set_string(&self.storage_key, &encoded) {
            error!(
                "event=notes_save module=repo status=error key={} count={} error={}",
                self.storage_key,
                notes.len(),
                err
            );
            return Err(err.into());
        }
        debug!(
            "event=notes_save module=repo status=ok count={}",
            notes.len()
        );
        Ok(())
    }

    fn add(&self, note: &Note) -> RepoResult<()> {
        let mut notes = self.load_all()?;
        notes.push(note.clone());
        self.save_all(&notes)
    }

    fn update(&self, note: &Note) -> RepoResult<bool> {
        let mut notes = self.load_all()?;
        let Some(slot) = notes.iter_mut().find(|existing| existing.id == note.id) else {
            debug!("event=notes_update module=repo status=no_match");
            return Ok(false);
        };
        *slot = note.clone();
        self.save_all(&notes)?;
        Ok(true)
    }

    fn remove(&self, id: &str) -> RepoResult<usize> {
        let mut notes = self.load_all()?;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        let removed = before - notes.len();
        if removed == 0 {
            debug!("event=notes_remove module=repo status=no_match");
            return Ok(0);
        }
        self.save_all(&notes)?;
        Ok(removed)
    }
}

/// Encodes a note collection into its persisted JSON array form.
pub fn encode_notes(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string(notes)
}

/// Decodes a persisted JSON array into notes.
pub fn decode_notes(raw: &str) -> serde_json::Result<Vec<Note>> {
    serde_json::from_str(raw)
}
