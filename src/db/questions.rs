use rusqlite::{params, Connection, Error as SqlError, ErrorCode};
use tracing::info;

use crate::codec::QuestionRow;
use crate::error::{CoreError, Result};

/// Drop and recreate the `questions` table, then insert every row inside a
/// single transaction. Whatever the table held before is discarded.
pub fn replace_questions(conn: &mut Connection, rows: &[QuestionRow]) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute("DROP TABLE IF EXISTS questions", [])?;
    tx.execute(
        "CREATE TABLE questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            question_title TEXT,
            question_type TEXT,
            question_content TEXT,
            answer_content TEXT
        )",
        [],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO questions (company_name, question_title, question_type,
                                    question_content, answer_content)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.company_name,
                row.question_title,
                row.question_type,
                row.question_content,
                row.answer_content,
            ])?;
        }
    }

    tx.commit()?;
    info!(rows = rows.len(), "wrote questions table");
    Ok(())
}

/// Read every row of the `questions` table. A plain scan of a rowid table
/// yields insertion order; views and `WITHOUT ROWID` tables are read as-is.
///
/// A missing table or column is a [`CoreError::Schema`], so callers can tell
/// "readable but not ours" apart from I/O trouble.
pub fn fetch_questions(conn: &Connection) -> Result<Vec<QuestionRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT company_name, question_title, question_type, question_content, answer_content
             FROM questions",
        )
        .map_err(map_schema_error)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(QuestionRow {
                company_name: row.get(0)?,
                question_title: row.get(1)?,
                question_type: row.get(2)?,
                question_content: row.get(3)?,
                answer_content: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Statement preparation fails on unknown tables and columns. Files that are
/// not SQLite databases at all stay generic database errors.
fn map_schema_error(err: SqlError) -> CoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::NotADatabase) | Some(ErrorCode::CannotOpen) => CoreError::Database(err),
        _ => CoreError::Schema(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, title: &str) -> QuestionRow {
        QuestionRow {
            company_name: company.into(),
            question_title: Some(title.into()),
            question_type: Some(String::new()),
            question_content: Some("q".into()),
            answer_content: Some("a".into()),
        }
    }

    #[test]
    fn replace_discards_previous_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        replace_questions(&mut conn, &[row("A", "1"), row("A", "2")]).unwrap();
        replace_questions(&mut conn, &[row("B", "only")]).unwrap();

        let rows = fetch_questions(&conn).unwrap();
        assert_eq!(rows, vec![row("B", "only")]);
    }

    #[test]
    fn missing_table_is_a_schema_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE other (id INTEGER)", []).unwrap();

        let err = fetch_questions(&conn).unwrap_err();
        assert!(matches!(err, CoreError::Schema(_)), "{err:?}");
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE questions (id INTEGER PRIMARY KEY, company_name TEXT NOT NULL)",
            [],
        )
        .unwrap();

        assert!(matches!(fetch_questions(&conn), Err(CoreError::Schema(_))));
    }

    #[test]
    fn view_named_questions_is_readable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE raw (company_name TEXT NOT NULL, question_title TEXT,
                               question_type TEXT, question_content TEXT,
                               answer_content TEXT);
             INSERT INTO raw VALUES ('A', '1', '', 'q', 'a');
             INSERT INTO raw VALUES ('A', '2', '', 'q', 'a');
             CREATE VIEW questions AS SELECT * FROM raw;",
        )
        .unwrap();

        let rows = fetch_questions(&conn).unwrap();
        assert_eq!(rows, vec![row("A", "1"), row("A", "2")]);
    }

    #[test]
    fn without_rowid_table_is_readable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE questions (company_name TEXT NOT NULL, question_title TEXT PRIMARY KEY,
                                     question_type TEXT, question_content TEXT,
                                     answer_content TEXT) WITHOUT ROWID;
             INSERT INTO questions VALUES ('B', 'only', '', 'q', 'a');",
        )
        .unwrap();

        assert_eq!(fetch_questions(&conn).unwrap(), vec![row("B", "only")]);
    }

    #[test]
    fn null_columns_come_back_as_none() {
        let mut conn = Connection::open_in_memory().unwrap();
        replace_questions(&mut conn, &[]).unwrap();
        conn.execute("INSERT INTO questions (company_name) VALUES ('A')", [])
            .unwrap();

        let rows = fetch_questions(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].question_title, None);
        assert_eq!(rows[0].answer_content, None);
    }
}
