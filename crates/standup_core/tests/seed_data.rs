use rusqlite::Connection;
use standup_core::db::seed::{apply_seed, CHECK_INS_FILE, PRIORITIES_FILE, USERS_FILE};
use standup_core::{
    open_db_in_memory, open_seeded_db, Category, CheckInRepository, NewPriority,
    PriorityRepository, SeedData, SeedError, SeedSource, SqliteCheckInRepository,
    SqlitePriorityRepository, SqliteUserRepository, UserRepository,
};
use std::fs;

#[test]
fn embedded_seed_populates_all_collections() {
    let conn = open_seeded_db(&SeedSource::Embedded).unwrap();
    let data = SeedData::embedded().unwrap();

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let priorities = SqlitePriorityRepository::try_new(&conn).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    assert_eq!(users.list_users().unwrap().len(), data.users.len());
    assert_eq!(
        priorities.list_priorities().unwrap().len(),
        data.priorities.len()
    );
    assert_eq!(check_ins.list_check_ins().unwrap().len(), data.check_ins.len());
}

#[test]
fn legacy_handle_references_resolve_to_numeric_ids() {
    let conn = open_seeded_db(&SeedSource::Embedded).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let priorities = SqlitePriorityRepository::try_new(&conn).unwrap();

    let sarah = users.find_user_by_handle("user-1").unwrap().unwrap();
    assert_eq!(sarah.id, 1);

    let first = priorities.get_priority(1).unwrap();
    assert_eq!(first.user_id, sarah.id);
    assert_eq!(first.category, Some(Category::Campaign));
    assert!(first.is_completed());
}

#[test]
fn check_in_dates_are_truncated_and_links_keep_order() {
    let conn = open_seeded_db(&SeedSource::Embedded).unwrap();
    let check_ins = SqliteCheckInRepository::try_new(&conn).unwrap();

    let first = check_ins.get_check_in(1).unwrap();
    assert_eq!(first.priority_ids, vec![1, 2, 3]);
    assert_eq!(first.day % 86_400_000, 0);
}

#[test]
fn id_sequence_continues_after_seed_maximum() {
    let conn = open_seeded_db(&SeedSource::Embedded).unwrap();
    let priorities = SqlitePriorityRepository::try_new(&conn).unwrap();

    let max_seeded = priorities
        .list_priorities()
        .unwrap()
        .iter()
        .map(|priority| priority.id)
        .max()
        .unwrap();
    let created = priorities
        .create_priority(&NewPriority::new(1, "after seed"), 0)
        .unwrap();
    assert_eq!(created.id, max_seeded + 1);
}

#[test]
fn changes_are_never_written_back_to_the_seed() {
    let first = open_seeded_db(&SeedSource::Embedded).unwrap();
    SqlitePriorityRepository::try_new(&first)
        .unwrap()
        .delete_priority(1)
        .unwrap();

    let reloaded = open_seeded_db(&SeedSource::Embedded).unwrap();
    let priorities = SqlitePriorityRepository::try_new(&reloaded).unwrap();
    assert!(priorities.find_priority(1).unwrap().is_some());
}

#[test]
fn directory_seed_is_loaded_from_json_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(USERS_FILE),
        r#"[{"Id": 7, "id": "user-7", "name": "Kim", "joinedAt": "2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(PRIORITIES_FILE),
        r#"[{"Id": 3, "userId": "user-7", "text": "Plan offsite", "createdAt": "2024-01-02T08:00:00Z"}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(CHECK_INS_FILE),
        r#"[{"Id": 1, "userId": 7, "date": "2024-01-02T08:00:00Z", "priorities": [3], "submittedAt": "2024-01-02T08:00:00Z"}]"#,
    )
    .unwrap();

    let conn = open_seeded_db(&SeedSource::Directory(dir.path().to_path_buf())).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let user = users.get_user(7).unwrap();
    assert_eq!(user.name, "Kim");
    assert_eq!(user.weekly_streak, 0);
    assert_eq!(user.avatar, None);

    let priority = SqlitePriorityRepository::try_new(&conn)
        .unwrap()
        .get_priority(3)
        .unwrap();
    assert_eq!(priority.category, None);
    assert_eq!(priority.defer_count, 0);
}

#[test]
fn missing_seed_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_seeded_db(&SeedSource::Directory(dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, SeedError::Io { .. }));
}

#[test]
fn unknown_handle_aborts_the_whole_seed() {
    let mut conn = open_db_in_memory().unwrap();
    let data = SeedData::from_json(
        r#"[{"Id": 1, "id": "user-1", "name": "A", "joinedAt": "2024-01-01T00:00:00Z"}]"#,
        r#"[{"Id": 1, "userId": "user-9", "text": "x", "createdAt": "2024-01-01T00:00:00Z"}]"#,
        "[]",
    )
    .unwrap();

    let err = apply_seed(&mut conn, &data).unwrap_err();
    assert!(matches!(err, SeedError::UnknownUser(handle) if handle == "user-9"));
    assert_eq!(count_rows(&conn, "users"), 0);
}

#[test]
fn unknown_numeric_user_id_aborts_the_whole_seed() {
    let mut conn = open_db_in_memory().unwrap();
    let data = SeedData::from_json(
        r#"[{"Id": 1, "id": "user-1", "name": "A", "joinedAt": "2024-01-01T00:00:00Z"}]"#,
        r#"[{"Id": 1, "userId": 99, "text": "x", "createdAt": "2024-01-01T00:00:00Z"}]"#,
        "[]",
    )
    .unwrap();

    let err = apply_seed(&mut conn, &data).unwrap_err();
    assert!(matches!(err, SeedError::UnknownUser(reference) if reference == "99"));
    assert_eq!(count_rows(&conn, "users"), 0);
    assert_eq!(count_rows(&conn, "priorities"), 0);
}

#[test]
fn check_in_for_unknown_numeric_user_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let data = SeedData::from_json(
        r#"[{"Id": 1, "id": "user-1", "name": "A", "joinedAt": "2024-01-01T00:00:00Z"}]"#,
        "[]",
        r#"[{"Id": 1, "userId": 2, "date": "2024-01-02T08:00:00Z", "priorities": [], "submittedAt": "2024-01-02T08:00:00Z"}]"#,
    )
    .unwrap();

    let err = apply_seed(&mut conn, &data).unwrap_err();
    assert!(matches!(err, SeedError::UnknownUser(reference) if reference == "2"));
    assert_eq!(count_rows(&conn, "check_ins"), 0);
}

#[test]
fn unknown_category_label_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let data = SeedData::from_json(
        r#"[{"Id": 1, "id": "user-1", "name": "A", "joinedAt": "2024-01-01T00:00:00Z"}]"#,
        r#"[{"Id": 1, "userId": 1, "text": "x", "category": "Chores", "createdAt": "2024-01-01T00:00:00Z"}]"#,
        "[]",
    )
    .unwrap();

    let err = apply_seed(&mut conn, &data).unwrap_err();
    assert!(matches!(err, SeedError::InvalidCategory(label) if label == "Chores"));
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
