//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note screens' use-cases to Dart via FRB.
//! - Flatten core types into plain string/number envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Note use-cases run one at a time per process: the collection is
//!   rewritten whole on every mutation.
//! - Store tunables are fixed by the first successful `configure_store`;
//!   until then defaults apply.

use jotter_core::db::open_db;
use jotter_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, Attachment, DrawingRecorder, FileStore, Note, NoteSearchHit,
    NoteSearchQuery, NoteService, Point, PrefsNoteRepository, Rgba, SqlitePreferenceStore,
    StoreConfig, StrokeSample, StrokeStyle,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_LIMIT_MAX: u32 = 50;
const DB_FILE_NAME: &str = "jotter.sqlite3";
const DATA_DIR_NAME: &str = "jotter_data";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();
static NOTES_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive);
///   blank picks the build's default level.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        explicit => explicit,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets store tunables from a JSON object, e.g.
/// `{"corrupt_data_policy":"fail","canvas_width":800}`.
///
/// Missing fields keep their defaults; blank input means all defaults.
///
/// # FFI contract
/// - Call once at startup, before the first note call.
/// - Repeating the active config is a no-op; a different one is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(config_json: String) -> String {
    let raw = match config_json.trim() {
        "" => "{}",
        raw => raw,
    };
    let config = match StoreConfig::from_json(raw) {
        Ok(config) => config,
        Err(err) => return err.to_string(),
    };
    let active = STORE_CONFIG.get_or_init(|| config.clone());
    if *active != config {
        warn!("event=store_configure module=ffi status=error error_code=already_configured");
        return "store already configured; refusing to switch config".to_string();
    }
    info!(
        "event=store_configure module=ffi status=ok policy={:?} canvas={}x{}",
        active.corrupt_data_policy, active.canvas_width, active.canvas_height
    );
    String::new()
}

/// Attachment as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentItem {
    pub id: String,
    pub path: String,
    pub file_name: String,
    pub is_image: bool,
}

/// Note as seen by Dart. Timestamps are ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub attachments: Vec<AttachmentItem>,
}

/// One recorded drawing input from the canvas widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingPointItem {
    pub x: f32,
    pub y: f32,
    /// Flutter `Color.value` layout: `0xAARRGGBB`.
    pub argb: u32,
    pub width: f32,
    /// Gesture end; `x`/`y` are ignored.
    pub pen_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Saved note for create/edit; `None` for delete and failures.
    pub note: Option<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            note,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentResponse {
    pub ok: bool,
    pub attachment: Option<AttachmentItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchItem {
    pub note_id: String,
    pub title: String,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchResponse {
    pub items: Vec<NoteSearchItem>,
    pub message: String,
    pub applied_limit: u32,
}

/// Lists every stored note in storage order.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match with_note_service(|service| service.list_notes().map_err(|err| err.to_string())) {
        Ok(notes) => NotesListResponse {
            ok: true,
            message: format!("Loaded {} note(s).", notes.len()),
            items: notes.iter().map(to_note_item).collect(),
        },
        Err(err) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note from the editor screen.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(
    title: String,
    content: String,
    attachments: Vec<AttachmentItem>,
) -> NoteActionResponse {
    let attachments = attachments.into_iter().map(from_attachment_item).collect();
    match with_note_service(|service| {
        service
            .create_note(&title, &content, attachments)
            .map_err(|err| err.to_string())
    }) {
        Ok(note) => NoteActionResponse::success("Note created.", Some(to_note_item(&note))),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Saves edits to an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_edit(
    id: String,
    title: String,
    content: String,
    attachments: Vec<AttachmentItem>,
) -> NoteActionResponse {
    let attachments = attachments.into_iter().map(from_attachment_item).collect();
    match with_note_service(|service| {
        service
            .edit_note(&id, &title, &content, attachments)
            .map_err(|err| err.to_string())
    }) {
        Ok(note) => NoteActionResponse::success("Note saved.", Some(to_note_item(&note))),
        Err(err) => NoteActionResponse::failure(format!("note_edit failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    match with_note_service(|service| service.delete_note(&id).map_err(|err| err.to_string())) {
        Ok(()) => NoteActionResponse::success("Note deleted.", None),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// Searches titles and bodies.
///
/// Limit defaults to 20 and is capped at 50.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_search(text: String, limit: Option<u32>) -> NoteSearchResponse {
    let applied_limit = normalize_search_limit(limit);
    let query = NoteSearchQuery {
        text: text.trim().to_string(),
        limit: applied_limit,
    };
    match with_note_service(|service| service.search(&query).map_err(|err| err.to_string())) {
        Ok(hits) => {
            let items = hits.into_iter().map(to_search_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            };
            NoteSearchResponse {
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => NoteSearchResponse {
            items: Vec::new(),
            message: format!("notes_search failed: {err}"),
            applied_limit,
        },
    }
}

/// Copies a picked image into app storage.
#[flutter_rust_bridge::frb(sync)]
pub fn note_attach_image(source_path: String) -> AttachmentResponse {
    attachment_response(
        "note_attach_image",
        with_note_service(|service| {
            service
                .attach_image(source_path.trim())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Rasterizes a drawing into app storage.
#[flutter_rust_bridge::frb(sync)]
pub fn note_attach_drawing(points: Vec<DrawingPointItem>) -> AttachmentResponse {
    let samples = to_stroke_samples(&points);
    attachment_response(
        "note_attach_drawing",
        with_note_service(|service| {
            service
                .attach_drawing(&samples)
                .map_err(|err| err.to_string())
        }),
    )
}

fn attachment_response(
    operation: &str,
    result: Result<Attachment, String>,
) -> AttachmentResponse {
    match result {
        Ok(attachment) => AttachmentResponse {
            ok: true,
            attachment: Some(to_attachment_item(&attachment)),
            message: "Attachment stored.".to_string(),
        },
        Err(err) => AttachmentResponse {
            ok: false,
            attachment: None,
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SEARCH_DEFAULT_LIMIT,
        Some(value) => value.min(SEARCH_LIMIT_MAX),
    }
}

fn resolve_env_path(
    cell: &'static OnceLock<PathBuf>,
    var: &str,
    fallback_name: &str,
) -> PathBuf {
    cell.get_or_init(|| {
        if let Ok(raw) = std::env::var(var) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        std::env::temp_dir().join(fallback_name)
    })
    .clone()
}

fn resolve_db_path() -> PathBuf {
    resolve_env_path(&DB_PATH, "JOTTER_DB_PATH", DB_FILE_NAME)
}

fn resolve_data_dir() -> PathBuf {
    resolve_env_path(&DATA_DIR, "JOTTER_DATA_DIR", DATA_DIR_NAME)
}

type FfiNoteService<'conn> = NoteService<PrefsNoteRepository<SqlitePreferenceStore<'conn>>>;

fn with_note_service<T>(
    f: impl FnOnce(&FfiNoteService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = NOTES_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=ffi_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    });
    let config = STORE_CONFIG.get().cloned().unwrap_or_default();
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let files = FileStore::with_config(resolve_data_dir(), &config)
        .map_err(|err| format!("file store init failed: {err}"))?;
    let repo = PrefsNoteRepository::with_config(SqlitePreferenceStore::new(&conn), &config);
    let service = NoteService::new(repo, files);
    f(&service)
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        title: note.title.clone(),
        content: note.content.clone(),
        created_at: jotter_core::model::timestamp::format_timestamp(&note.created_at),
        updated_at: note
            .updated_at
            .as_ref()
            .map(jotter_core::model::timestamp::format_timestamp),
        attachments: note.attachments.iter().map(to_attachment_item).collect(),
    }
}

fn to_attachment_item(attachment: &Attachment) -> AttachmentItem {
    AttachmentItem {
        id: attachment.id.clone(),
        path: attachment.path.clone(),
        file_name: attachment.file_name.clone(),
        is_image: attachment.is_image,
    }
}

fn from_attachment_item(item: AttachmentItem) -> Attachment {
    Attachment::with_id(item.id, item.path, item.file_name, item.is_image)
}

fn to_search_item(hit: NoteSearchHit) -> NoteSearchItem {
    NoteSearchItem {
        note_id: hit.note_id,
        title: hit.title,
        snippet: hit.snippet,
    }
}

fn to_stroke_samples(points: &[DrawingPointItem]) -> Vec<StrokeSample> {
    let mut recorder = DrawingRecorder::default();
    for point in points {
        let [a, r, g, b] = point.argb.to_be_bytes();
        recorder.set_style(StrokeStyle {
            color: Rgba { r, g, b, a },
            width: point.width,
        });
        if point.pen_up {
            recorder.pen_up();
        } else {
            recorder.drag_to(Point::new(point.x, point.y));
        }
    }
    recorder.into_samples()
}
