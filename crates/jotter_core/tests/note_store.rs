use chrono::{TimeZone, Utc};
use jotter_core::db::open_db_in_memory;
use jotter_core::{
    Attachment, CorruptDataPolicy, MemoryPreferenceStore, Note, NoteRepository, PreferenceStore,
    PrefsNoteRepository, RepoError, SqlitePreferenceStore, StoreConfig,
};

fn note(id: &str, title: &str) -> Note {
    let created = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed timestamp");
    Note::with_id(id, title, format!("body of {title}"), created)
}

fn repo_with_policy(
    store: &MemoryPreferenceStore,
    policy: CorruptDataPolicy,
) -> PrefsNoteRepository<&MemoryPreferenceStore> {
    let config = StoreConfig {
        corrupt_data_policy: policy,
        ..StoreConfig::default()
    };
    PrefsNoteRepository::with_config(store, &config)
}

fn raw_value(store: &MemoryPreferenceStore, key: &str) -> Option<String> {
    store.get_string(key).expect("memory store read should succeed")
}

#[test]
fn load_all_on_fresh_store_is_empty() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    assert!(repo.load_all().expect("load_all should succeed").is_empty());
}

#[test]
fn save_all_then_load_all_returns_same_record() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let created = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixed timestamp");
    let input = Note::with_id("1", "A", "", created);

    repo.save_all(std::slice::from_ref(&input))
        .expect("save_all should succeed");

    assert_eq!(repo.load_all().expect("load_all should succeed"), vec![input]);
    let raw = raw_value(repo.store(), "notes").expect("notes key should be written");
    assert_eq!(
        raw,
        r#"[{"id":"1","title":"A","content":"","createdAt":"2024-01-01T00:00:00Z","updatedAt":null,"attachments":[]}]"#
    );
}

#[test]
fn add_keeps_every_note_in_insertion_order() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let notes = (0..5)
        .map(|idx| note(&format!("id-{idx}"), &format!("note {idx}")))
        .collect::<Vec<_>>();

    for item in &notes {
        repo.add(item).expect("add should succeed");
    }

    assert_eq!(repo.load_all().expect("load_all should succeed"), notes);
}

#[test]
fn update_replaces_only_matching_record_and_keeps_caller_updated_at() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let first = note("a", "first");
    let second = note("b", "second");
    let third = note("c", "third");
    repo.save_all(&[first.clone(), second.clone(), third.clone()])
        .expect("save_all should succeed");

    let stamp = Utc
        .with_ymd_and_hms(2030, 6, 1, 12, 0, 0)
        .single()
        .expect("valid fixed timestamp");
    let mut changed = second.edited("second v2", "new body", Vec::new(), stamp);
    changed
        .attachments
        .push(Attachment::with_id("att", "/n/image.png", "image.png", true));

    assert!(repo.update(&changed).expect("update should succeed"));

    let loaded = repo.load_all().expect("load_all should succeed");
    assert_eq!(loaded, vec![first, changed, third]);
    assert_eq!(loaded[1].updated_at, Some(stamp));
}

#[test]
fn update_with_unknown_id_leaves_bytes_unchanged() {
    let store = MemoryPreferenceStore::new();
    let repo = PrefsNoteRepository::new(&store);
    repo.save_all(&[note("a", "first"), note("b", "second")])
        .expect("save_all should succeed");
    let before = raw_value(&store, "notes");

    assert!(!repo
        .update(&note("zzz", "ghost"))
        .expect("update should succeed"));

    assert_eq!(raw_value(&store, "notes"), before);
}

#[test]
fn update_replaces_first_of_duplicate_ids_only() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let dup_a = note("dup", "one");
    let dup_b = note("dup", "two");
    repo.save_all(&[dup_a, dup_b.clone()])
        .expect("save_all should succeed");

    let replacement = note("dup", "replaced");
    repo.update(&replacement).expect("update should succeed");

    assert_eq!(
        repo.load_all().expect("load_all should succeed"),
        vec![replacement, dup_b]
    );
}

#[test]
fn remove_drops_all_matches_and_preserves_order() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let keep_1 = note("k1", "keep one");
    let keep_2 = note("k2", "keep two");
    repo.save_all(&[
        note("x", "drop"),
        keep_1.clone(),
        note("x", "drop again"),
        keep_2.clone(),
    ])
    .expect("save_all should succeed");

    assert_eq!(repo.remove("x").expect("remove should succeed"), 2);
    assert_eq!(
        repo.load_all().expect("load_all should succeed"),
        vec![keep_1, keep_2]
    );
    assert_eq!(repo.remove("x").expect("remove should succeed"), 0);
}

#[test]
fn get_finds_note_by_id() {
    let repo = PrefsNoteRepository::new(MemoryPreferenceStore::new());
    let target = note("t", "target");
    repo.save_all(&[note("o", "other"), target.clone()])
        .expect("save_all should succeed");

    assert_eq!(repo.get("t").expect("get should succeed"), Some(target));
    assert_eq!(repo.get("missing").expect("get should succeed"), None);
}

#[test]
fn corrupt_value_with_backup_policy_is_preserved() {
    let store = MemoryPreferenceStore::new();
    store
        .set_string("notes", "{not json")
        .expect("seed corrupt value");
    let repo = repo_with_policy(&store, CorruptDataPolicy::Backup);

    assert!(repo.load_all().expect("load_all should recover").is_empty());
    assert_eq!(raw_value(&store, "notes.corrupt").as_deref(), Some("{not json"));
    assert_eq!(raw_value(&store, "notes"), None);

    repo.add(&note("n", "fresh start")).expect("add should succeed");
    assert_eq!(repo.load_all().expect("load_all should succeed").len(), 1);
    assert_eq!(raw_value(&store, "notes.corrupt").as_deref(), Some("{not json"));
}

#[test]
fn repeated_corruption_keeps_every_backup() {
    let store = MemoryPreferenceStore::new();
    let repo = repo_with_policy(&store, CorruptDataPolicy::Backup);

    store.set_string("notes", "first garbage").expect("seed first");
    repo.load_all().expect("first recovery");
    repo.load_all().expect("reload after recovery");
    store.set_string("notes", "second garbage").expect("seed second");
    repo.load_all().expect("second recovery");

    assert_eq!(
        raw_value(&store, "notes.corrupt").as_deref(),
        Some("first garbage")
    );
    assert_eq!(
        raw_value(&store, "notes.corrupt.1").as_deref(),
        Some("second garbage")
    );
    assert_eq!(raw_value(&store, "notes.corrupt.2"), None);
}

#[test]
fn corrupt_value_with_discard_policy_reads_as_empty() {
    let store = MemoryPreferenceStore::new();
    store
        .set_string("notes", "[{\"id\":1}]")
        .expect("seed corrupt value");
    let repo = repo_with_policy(&store, CorruptDataPolicy::Discard);

    assert!(repo.load_all().expect("load_all should recover").is_empty());
    assert_eq!(raw_value(&store, "notes.corrupt"), None);
}

#[test]
fn corrupt_value_with_fail_policy_is_an_error() {
    let store = MemoryPreferenceStore::new();
    store.set_string("notes", "garbage").expect("seed corrupt value");
    let repo = repo_with_policy(&store, CorruptDataPolicy::Fail);

    let err = repo.load_all().expect_err("corrupt value should fail");
    assert!(matches!(err, RepoError::Corrupt { ref key, .. } if key == "notes"));

    let add_err = repo
        .add(&note("n", "blocked"))
        .expect_err("add over corrupt value should fail");
    assert!(matches!(add_err, RepoError::Corrupt { .. }));
    assert_eq!(raw_value(&store, "notes").as_deref(), Some("garbage"));
}

#[test]
fn custom_storage_key_is_honored() {
    let store = MemoryPreferenceStore::new();
    let config = StoreConfig {
        storage_key: "notes_v2".to_string(),
        ..StoreConfig::default()
    };
    let repo = PrefsNoteRepository::with_config(&store, &config);
    repo.add(&note("n", "keyed")).expect("add should succeed");

    assert_eq!(repo.storage_key(), "notes_v2");
    assert!(raw_value(&store, "notes_v2").is_some());
    assert_eq!(raw_value(&store, "notes"), None);
}

#[test]
fn sqlite_backed_repository_persists_collection() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("prefs.sqlite3");
    let first = note("a", "first");
    let second = note("b", "second");

    {
        let conn = jotter_core::db::open_db(&path).expect("open file db");
        let repo = PrefsNoteRepository::new(SqlitePreferenceStore::new(&conn));
        repo.add(&first).expect("add first");
        repo.add(&second).expect("add second");
        repo.remove("a").expect("remove first");
    }

    let conn = jotter_core::db::open_db(&path).expect("reopen file db");
    let repo = PrefsNoteRepository::new(SqlitePreferenceStore::new(&conn));
    assert_eq!(
        repo.load_all().expect("load_all should succeed"),
        vec![second]
    );
}

#[test]
fn sqlite_store_keeps_single_row_for_collection() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let repo = PrefsNoteRepository::new(SqlitePreferenceStore::new(&conn));
    for idx in 0..3 {
        repo.add(&note(&format!("{idx}"), "n")).expect("add should succeed");
    }

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM preferences WHERE key = 'notes';",
            [],
            |row| row.get(0),
        )
        .expect("count rows");
    assert_eq!(rows, 1);
}
