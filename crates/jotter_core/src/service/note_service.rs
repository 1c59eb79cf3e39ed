//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/edit/delete/list/search APIs for the note screens.
//! - Turn picked images and drawings into attachments.
//!
//! # Invariants
//! - Titles are trimmed-non-empty before anything is persisted.
//! - `edit_note` keeps `id` and `created_at` and stamps `updated_at`.
//! - Attachment file cleanup is best-effort and never fails a use-case.

use crate::files::{FileStore, FileStoreError};
use crate::model::attachment::Attachment;
use crate::model::drawing::StrokeSample;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::search::note_search::{search_notes, NoteSearchHit, NoteSearchQuery};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DRAWING_FILE_NAME: &str = "drawing.png";
const IMAGE_FALLBACK_NAME: &str = "image";

#[derive(Debug)]
pub enum NoteServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
    NoteNotFound(NoteId),
    Repo(RepoError),
    Files(FileStoreError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Files(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Files(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<FileStoreError> for NoteServiceError {
    fn from(value: FileStoreError) -> Self {
        Self::Files(value)
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over a repository and the attachment file store.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    files: FileStore,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R, files: FileStore) -> Self {
        Self { repo, files }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Creates and persists a new note.
    pub fn create_note(
        &self,
        title: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> ServiceResult<Note> {
        let title = validated_title(title)?;
        let note = Note::new(title, content, attachments);
        self.repo.add(&note)?;
        info!(
            "event=note_create module=service status=ok attachments={}",
            note.attachments.len()
        );
        Ok(note)
    }

    /// Replaces title, content and attachments of an existing note.
    ///
    /// Files of attachments dropped by the edit are removed.
    pub fn edit_note(
        &self,
        id: &str,
        title: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> ServiceResult<Note> {
        let title = validated_title(title)?;
        let current = self
            .repo
            .get(id)?
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))?;

        let edited = current.edited(title, content, attachments, Utc::now());
        if !self.repo.update(&edited)? {
            return Err(NoteServiceError::NoteNotFound(id.to_string()));
        }

        let dropped = current
            .attachments
            .iter()
            .filter(|old| !edited.attachments.iter().any(|kept| kept.path == old.path));
        self.discard_files(dropped);

        info!(
            "event=note_edit module=service status=ok attachments={}",
            edited.attachments.len()
        );
        Ok(edited)
    }

    /// Deletes every note with `id` and, best-effort, their attachment files.
    pub fn delete_note(&self, id: &str) -> ServiceResult<()> {
        let doomed = self
            .repo
            .load_all()?
            .into_iter()
            .filter(|note| note.id == id)
            .flat_map(|note| note.attachments)
            .collect::<Vec<_>>();
        let removed = self.repo.remove(id)?;
        if removed == 0 {
            return Err(NoteServiceError::NoteNotFound(id.to_string()));
        }
        self.discard_files(&doomed);
        info!(
            "event=note_delete module=service status=ok removed={removed} attachments={}",
            doomed.len()
        );
        Ok(())
    }

    pub fn get_note(&self, id: &str) -> ServiceResult<Option<Note>> {
        Ok(self.repo.get(id)?)
    }

    /// All notes in storage order.
    pub fn list_notes(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.load_all()?)
    }

    pub fn search(&self, query: &NoteSearchQuery) -> ServiceResult<Vec<NoteSearchHit>> {
        let notes = self.repo.load_all()?;
        Ok(search_notes(&notes, query))
    }

    /// Copies a picked image into the notes directory.
    pub fn attach_image(&self, source: impl AsRef<Path>) -> ServiceResult<Attachment> {
        let source = source.as_ref();
        let stored = self.files.store_image(source)?;
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| IMAGE_FALLBACK_NAME.to_string());
        Ok(Attachment::image(
            stored.to_string_lossy().into_owned(),
            file_name,
        ))
    }

    /// Rasterizes a drawing into the notes directory.
    pub fn attach_drawing(&self, samples: &[StrokeSample]) -> ServiceResult<Attachment> {
        let stored = self.files.store_drawing(samples)?;
        Ok(Attachment::image(
            stored.to_string_lossy().into_owned(),
            DRAWING_FILE_NAME,
        ))
    }

    fn discard_files<'a>(&self, attachments: impl IntoIterator<Item = &'a Attachment>) {
        for attachment in attachments {
            let path = Path::new(&attachment.path);
            if !self.files.owns(path) {
                continue;
            }
            if let Err(err) = self.files.remove_file(path) {
                warn!(
                    "event=attachment_cleanup module=service status=error error_code=remove_failed error={err}"
                );
            }
        }
    }
}

fn validated_title(title: &str) -> ServiceResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NoteServiceError::EmptyTitle);
    }
    Ok(trimmed)
}
