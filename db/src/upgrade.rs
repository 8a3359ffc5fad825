//! Brings notes databases written by older versions of the app up to the
//! layout the embedded migrations expect.
//!
//! Those files carry their schema version in `PRAGMA user_version` instead of
//! a Diesel migrations table. Version 3 added `is_english_mode` to
//! `verse_references`; anything older gets the column added, or loses its
//! tables when the column cannot be added.
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use log::{info, warn};

use crate::DbError;

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 3;

#[derive(QueryableByName)]
struct UserVersion {
    #[diesel(sql_type = Integer)]
    user_version: i32,
}

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct ColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

pub fn user_version(conn: &mut SqliteConnection) -> Result<i32, DbError> {
    let row: UserVersion = sql_query("PRAGMA user_version").get_result(conn)?;
    Ok(row.user_version)
}

pub fn stamp_version(conn: &mut SqliteConnection) -> Result<(), DbError> {
    sql_query(format!("PRAGMA user_version = {SCHEMA_VERSION}")).execute(conn)?;
    Ok(())
}

fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool, DbError> {
    let rows: Vec<TableName> =
        sql_query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind::<Text, _>(table)
            .load(conn)?;
    Ok(!rows.is_empty())
}

fn has_column(conn: &mut SqliteConnection, table: &str, column: &str) -> Result<bool, DbError> {
    let columns: Vec<ColumnInfo> = sql_query(format!("PRAGMA table_info({table})")).load(conn)?;
    Ok(columns.iter().any(|c| c.name == column))
}

/// Upgrades a pre-version-3 notes database in place. Fresh and current
/// databases are left untouched.
pub fn upgrade_legacy(conn: &mut SqliteConnection) -> Result<(), DbError> {
    let version = user_version(conn)?;
    if version >= SCHEMA_VERSION || !table_exists(conn, "verse_references")? {
        return Ok(());
    }

    info!("Upgrading notes database from schema version {version}");

    if !has_column(conn, "verse_references", "is_english_mode")? {
        let altered = sql_query(
            "ALTER TABLE verse_references ADD COLUMN is_english_mode INTEGER NOT NULL DEFAULT 0",
        )
        .execute(conn);

        if let Err(e) = altered {
            warn!("Could not add is_english_mode ({e}), recreating the notes tables");
            return drop_tables(conn);
        }
    }

    // Older builds declared every column nullable. Text gets a default; a
    // row missing its verse address cannot be kept.
    let orphans = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        sql_query("UPDATE notes SET title = '' WHERE title IS NULL").execute(conn)?;
        sql_query("UPDATE verse_references SET verse_text = '' WHERE verse_text IS NULL")
            .execute(conn)?;
        sql_query("UPDATE verse_references SET is_english_mode = 0 WHERE is_english_mode IS NULL")
            .execute(conn)?;
        sql_query(
            "DELETE FROM verse_references WHERE note_id IS NULL OR book_name IS NULL \
             OR chapter IS NULL OR verse IS NULL",
        )
        .execute(conn)
    })?;
    if orphans > 0 {
        warn!("Removed {orphans} note verse(s) without a verse address");
    }

    if table_exists(conn, "verse_highlights")? {
        sql_query(
            "DELETE FROM verse_highlights WHERE book_name IS NULL OR chapter IS NULL \
             OR verse IS NULL OR color IS NULL",
        )
        .execute(conn)?;

        // Keep the newest row per verse so the unique index can be built.
        let removed = sql_query(
            "DELETE FROM verse_highlights WHERE id NOT IN \
             (SELECT MAX(id) FROM verse_highlights GROUP BY book_name, chapter, verse)",
        )
        .execute(conn)?;
        if removed > 0 {
            info!("Removed {removed} duplicate highlight(s)");
        }
    }

    Ok(())
}

fn drop_tables(conn: &mut SqliteConnection) -> Result<(), DbError> {
    for table in [
        "verse_references",
        "notes",
        "verse_highlights",
        "__diesel_schema_migrations",
    ] {
        sql_query(format!("DROP TABLE IF EXISTS {table}")).execute(conn)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{establish_connection, open_notes_db};

    fn legacy_v2(path: &str) {
        let mut conn = establish_connection(path).unwrap();
        for stmt in [
            "CREATE TABLE notes(id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT)",
            "CREATE TABLE verse_references(id INTEGER PRIMARY KEY AUTOINCREMENT, \
             note_id INTEGER, book_name TEXT, chapter INTEGER, verse INTEGER, verse_text TEXT, \
             FOREIGN KEY(note_id) REFERENCES notes(id) ON DELETE CASCADE)",
            "CREATE TABLE verse_highlights(id INTEGER PRIMARY KEY AUTOINCREMENT, \
             book_name TEXT, chapter INTEGER, verse INTEGER, color INTEGER)",
            "INSERT INTO notes(id, title) VALUES (1, 'Grace')",
            "INSERT INTO verse_references(note_id, book_name, chapter, verse, verse_text) \
             VALUES (1, 'John', 3, 16, NULL)",
            "INSERT INTO verse_highlights(book_name, chapter, verse, color) VALUES ('John', 3, 16, 1)",
            "INSERT INTO verse_highlights(book_name, chapter, verse, color) VALUES ('John', 3, 16, 2)",
            "PRAGMA user_version = 2",
        ] {
            sql_query(stmt).execute(&mut conn).unwrap();
        }
    }

    /// Rows older builds could leave without a verse address.
    fn add_incomplete_rows(path: &str) {
        let mut conn = establish_connection(path).unwrap();
        for stmt in [
            "INSERT INTO verse_references(note_id, book_name, chapter, verse, verse_text) \
             VALUES (NULL, 'John', 3, 17, 'orphan')",
            "INSERT INTO verse_references(note_id, book_name, chapter, verse, verse_text) \
             VALUES (1, NULL, 3, 17, 'no book')",
            "INSERT INTO verse_references(note_id, book_name, chapter, verse, verse_text) \
             VALUES (1, 'John', NULL, NULL, 'no address')",
            "INSERT INTO verse_highlights(book_name, chapter, verse, color) VALUES ('John', 3, NULL, 1)",
        ] {
            sql_query(stmt).execute(&mut conn).unwrap();
        }
    }

    #[test]
    fn fresh_database_is_stamped() {
        let mut conn = open_notes_db(":memory:").unwrap();
        assert_eq!(user_version(&mut conn).unwrap(), SCHEMA_VERSION);
        assert!(has_column(&mut conn, "verse_references", "is_english_mode").unwrap());
    }

    #[test]
    fn version_two_keeps_notes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bible_notes.db");
        let path = path.to_str().unwrap();
        legacy_v2(path);

        let mut conn = open_notes_db(path).unwrap();
        assert_eq!(user_version(&mut conn).unwrap(), SCHEMA_VERSION);

        let notes = crate::notes::all_notes(&mut conn).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Grace");
        assert_eq!(notes[0].verses[0].verse_text, "");
        assert!(!notes[0].verses[0].is_english);

        let highlights = crate::highlights::chapter_highlights(&mut conn, "John", 3).unwrap();
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].color.argb(), 2);
    }

    #[test]
    fn rows_without_an_address_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bible_notes.db");
        let path = path.to_str().unwrap();
        legacy_v2(path);
        add_incomplete_rows(path);

        let mut conn = open_notes_db(path).unwrap();
        let notes = crate::notes::all_notes(&mut conn).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].verses.len(), 1);
        assert_eq!(notes[0].verses[0].verse, 16);

        let highlights = crate::highlights::chapter_highlights(&mut conn, "John", 3).unwrap();
        assert_eq!(highlights.len(), 1);
    }

    #[test]
    fn reopening_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bible_notes.db");
        let path = path.to_str().unwrap();
        legacy_v2(path);

        drop(open_notes_db(path).unwrap());
        let mut conn = open_notes_db(path).unwrap();
        assert_eq!(crate::notes::all_notes(&mut conn).unwrap().len(), 1);
    }
}
