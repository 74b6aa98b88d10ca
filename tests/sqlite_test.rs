use jasoseo_manager::models::{Record, UNTITLED};
use jasoseo_manager::{CoreError, Workspace};
use rusqlite::Connection;
use tempfile::TempDir;

fn filled_workspace(dir: &TempDir) -> Workspace {
    let mut workspace = Workspace::new(dir.path());
    for (company, count) in [("Acme", 2), ("베타", 1)] {
        workspace.add_company(company).unwrap();
        for _ in 0..count {
            workspace.add_record(company).unwrap();
        }
    }
    workspace
        .update_record(
            "Acme",
            1,
            Record {
                title: "지원동기".into(),
                question_type: "동기".into(),
                question_text: "왜?".into(),
                answer_text: "줄1\n줄2".into(),
            },
        )
        .unwrap();
    workspace
}

#[test]
fn test_export_then_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let workspace = &mut filled_workspace(&dir);
    let db = dir.path().join("nested").join("essays.sqlite");

    assert_eq!(workspace.export_sql(&db).unwrap(), 3);

    let mut imported = Workspace::new(dir.path());
    let outcome = imported.load_sql_file(&db).unwrap();
    assert_eq!(outcome.merged_count, 2);
    assert_eq!(imported.store(), workspace.store());
    assert_eq!(imported.current_company(), Some("Acme"));
    assert!(imported.has_unsaved_changes());
}

#[test]
fn test_export_replaces_previous_rows() {
    let dir = TempDir::new().unwrap();
    let mut workspace = filled_workspace(&dir);
    let db = dir.path().join("essays.sqlite");
    workspace.export_sql(&db).unwrap();

    workspace.remove_company("Acme").unwrap();
    assert_eq!(workspace.export_sql(&db).unwrap(), 1);

    let conn = Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_import_fills_nulls() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("foreign.db");
    let conn = Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            question_title TEXT,
            question_type TEXT,
            question_content TEXT,
            answer_content TEXT
        );
        INSERT INTO questions (company_name, question_title) VALUES ('Acme', NULL);
        INSERT INTO questions (company_name, question_title, answer_content)
            VALUES ('Acme', '둘', 'answer');",
    )
    .unwrap();
    drop(conn);

    let mut workspace = Workspace::new(dir.path());
    workspace.load_path(&db).unwrap();

    let records = workspace.store().get("Acme").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, UNTITLED);
    assert_eq!(records[0].answer_text, "");
    assert_eq!(records[1].answer_text, "answer");
}

#[test]
fn test_import_errors_keep_store() {
    let dir = TempDir::new().unwrap();
    let mut workspace = filled_workspace(&dir);
    let before = workspace.store().clone();

    let missing = dir.path().join("missing.sqlite");
    assert!(matches!(
        workspace.load_sql_file(&missing),
        Err(CoreError::NotFound(_))
    ));
    assert!(!missing.exists());

    let no_table = dir.path().join("other.sqlite");
    Connection::open(&no_table)
        .unwrap()
        .execute_batch("CREATE TABLE notes (body TEXT);")
        .unwrap();
    assert!(matches!(
        workspace.load_sql_file(&no_table),
        Err(CoreError::Schema(_))
    ));

    let not_a_db = dir.path().join("notes.sqlite");
    std::fs::write(&not_a_db, "[회사명]: Acme\n=== 회사 끝 ===\n".repeat(64)).unwrap();
    assert!(matches!(
        workspace.load_sql_file(&not_a_db),
        Err(CoreError::Database(_))
    ));

    let empty = dir.path().join("empty.sqlite");
    let mut scratch = Workspace::new(dir.path());
    scratch.add_company("tmp").unwrap();
    scratch.export_sql(&empty).unwrap();
    assert!(matches!(
        workspace.load_sql_file(&empty),
        Err(CoreError::EmptyResult)
    ));

    assert_eq!(workspace.store(), &before);
}
