//! Attachment file storage.
//!
//! # Responsibility
//! - Own the app-private `notes` directory that backs attachments.
//! - Copy picked images and rasterize drawings into it.
//!
//! # Invariants
//! - Returned paths are absolute and live directly under the notes directory.
//! - Source images are copied, never moved or modified.
//! - Generated names are UUID v4 based and never reused.
//! - Drawings become visible under their final name only once fully written.

mod raster;

use crate::config::StoreConfig;
use crate::model::drawing::StrokeSample;
use image::ImageFormat;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

pub use raster::rasterize;

const IMAGE_PREFIX: &str = "image";
const DRAWING_PREFIX: &str = "drawing";
const DRAWING_EXTENSION: &str = "png";

pub type FileResult<T> = Result<T, FileStoreError>;

#[derive(Debug)]
pub enum FileStoreError {
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    Encode(image::ImageError),
    RelativeBaseDir(PathBuf),
    OutsideNotesDir(PathBuf),
}

impl Display for FileStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "{op} failed for `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode drawing: {err}"),
            Self::RelativeBaseDir(path) => {
                write!(f, "base directory must be absolute, got `{}`", path.display())
            }
            Self::OutsideNotesDir(path) => {
                write!(f, "`{}` is not inside the notes directory", path.display())
            }
        }
    }
}

impl Error for FileStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::RelativeBaseDir(_) | Self::OutsideNotesDir(_) => None,
        }
    }
}

fn io_error(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> FileStoreError {
    let path = path.to_path_buf();
    move |source| FileStoreError::Io { op, path, source }
}

/// Attachment directory owner.
#[derive(Debug, Clone)]
pub struct FileStore {
    notes_dir: PathBuf,
    canvas_width: u32,
    canvas_height: u32,
}

impl FileStore {
    /// Creates a store rooted at the absolute app-private `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> FileResult<Self> {
        Self::with_config(base_dir, &StoreConfig::default())
    }

    pub fn with_config(base_dir: impl Into<PathBuf>, config: &StoreConfig) -> FileResult<Self> {
        let base_dir = base_dir.into();
        if !base_dir.is_absolute() {
            return Err(FileStoreError::RelativeBaseDir(base_dir));
        }
        Ok(Self {
            notes_dir: base_dir.join(config.notes_dir_name.trim()),
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
        })
    }

    /// Notes directory path; may not exist yet.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Creates the notes directory when absent and returns it.
    pub fn ensure_notes_directory(&self) -> FileResult<PathBuf> {
        fs::create_dir_all(&self.notes_dir)
            .map_err(io_error("create notes directory", &self.notes_dir))?;
        Ok(self.notes_dir.clone())
    }

    /// Copies the image at `source` into the notes directory.
    ///
    /// The extension is kept (lowercased); the rest of the name is generated.
    pub fn store_image(&self, source: impl AsRef<Path>) -> FileResult<PathBuf> {
        let source = source.as_ref();
        let dir = self.ensure_notes_directory()?;
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let target = dir.join(unique_file_name(IMAGE_PREFIX, extension.as_deref()));

        match fs::copy(source, &target) {
            Ok(bytes) => {
                info!("event=file_store module=files status=ok kind=image bytes={bytes}");
                Ok(target)
            }
            Err(err) => {
                error!(
                    "event=file_store module=files status=error kind=image error_code=copy_failed error={err}"
                );
                Err(io_error("copy image", source)(err))
            }
        }
    }

    /// Rasterizes `samples` to a PNG in the notes directory.
    ///
    /// Empty input produces a blank white canvas.
    pub fn store_drawing(&self, samples: &[StrokeSample]) -> FileResult<PathBuf> {
        let dir = self.ensure_notes_directory()?;
        let canvas = rasterize(samples, self.canvas_width, self.canvas_height);

        let mut encoded = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(FileStoreError::Encode)?;

        let name = unique_file_name(DRAWING_PREFIX, Some(DRAWING_EXTENSION));
        let staging = dir.join(format!(".{name}.tmp"));
        let target = dir.join(&name);
        if let Err(err) = write_then_rename(&staging, &target, &encoded) {
            error!(
                "event=file_store module=files status=error kind=drawing error_code=write_failed error={err}"
            );
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        info!(
            "event=file_store module=files status=ok kind=drawing samples={} bytes={}",
            samples.len(),
            encoded.len()
        );
        Ok(target)
    }

    /// Deletes a stored attachment file.
    ///
    /// Returns `false` when the file is already gone. Paths outside the notes
    /// directory are refused.
    pub fn remove_file(&self, path: impl AsRef<Path>) -> FileResult<bool> {
        let path = path.as_ref();
        if !self.owns(path) {
            return Err(FileStoreError::OutsideNotesDir(path.to_path_buf()));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error("remove attachment", path)(err)),
        }
    }

    /// Whether `path` names an entry directly inside the notes directory.
    pub fn owns(&self, path: &Path) -> bool {
        let no_traversal = path
            .components()
            .all(|component| !matches!(component, Component::ParentDir | Component::CurDir));
        no_traversal && path.parent() == Some(self.notes_dir.as_path())
    }
}

fn unique_file_name(prefix: &str, extension: Option<&str>) -> String {
    let id = Uuid::new_v4().simple();
    match extension.filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{prefix}_{id}.{ext}"),
        None => format!("{prefix}_{id}"),
    }
}

fn write_then_rename(staging: &Path, target: &Path, bytes: &[u8]) -> FileResult<()> {
    fs::write(staging, bytes).map_err(io_error("write drawing", staging))?;
    fs::rename(staging, target).map_err(io_error("rename drawing", target))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{unique_file_name, FileStore, FileStoreError};
    use std::collections::HashSet;
    use std::path::PathBuf;

    #[test]
    fn unique_names_do_not_collide() {
        let names = (0..1000)
            .map(|_| unique_file_name("image", Some("jpg")))
            .collect::<HashSet<_>>();
        assert_eq!(names.len(), 1000);
        assert!(names.iter().all(|name| name.ends_with(".jpg")));
    }

    #[test]
    fn relative_base_dir_is_rejected() {
        let err = FileStore::new("relative/dir").expect_err("relative base is rejected");
        assert!(matches!(err, FileStoreError::RelativeBaseDir(_)));
    }

    #[test]
    fn owns_only_direct_children_of_notes_dir() {
        let store = FileStore::new("/data/app").expect("absolute base");
        assert!(store.owns(&PathBuf::from("/data/app/notes/image_1.png")));
        assert!(!store.owns(&PathBuf::from("/data/app/notes")));
        assert!(!store.owns(&PathBuf::from("/data/app/other.png")));
        assert!(!store.owns(&PathBuf::from("/data/app/notes/../secret")));
    }
}
