#[macro_use]
extern crate diesel;

use diesel::prelude::*;
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use thiserror::Error;

pub type DbConnection = SqliteConnection;

/// Migrations for the writable notes and highlights database.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone, Error, Debug, PartialEq)]
pub enum DbError {
    #[error("'{}' was not found.", book)]
    BookNotFound { book: String },

    #[error("Note {} was not found.", id)]
    NoteNotFound { id: i32 },

    #[error("Verse reference {} was not found.", id)]
    VerseReferenceNotFound { id: i32 },

    #[error("There was a database error. Root cause: {:?}.", cause)]
    Other { cause: String },

    #[error("There was a database migration error. Root cause: {:?}.", cause)]
    Migration { cause: String },

    #[error("Could not install the bundled database. Root cause: {:?}.", cause)]
    Asset { cause: String },

    #[error("The book table is inconsistent: {}", cause)]
    BookTable { cause: String },

    #[error("'{}' is not a valid Bible reference.", reference)]
    InvalidReference { reference: String },

    #[error("'{}' is not a highlight color.", color)]
    InvalidColor { color: String },
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Other {
            cause: e.to_string(),
        }
    }
}

/// Establishes a non-pooled SQLite connection.
pub fn establish_connection(db_url: &str) -> Result<SqliteConnection, DbError> {
    SqliteConnection::establish(db_url).map_err(|e| DbError::Other {
        cause: format!("Error connecting to {db_url}: {e}"),
    })
}

/// Opens the notes database, bringing legacy files up to date and
/// running any pending migrations.
pub fn open_notes_db(db_url: &str) -> Result<SqliteConnection, DbError> {
    let mut conn = establish_connection(db_url)?;
    sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;

    upgrade::upgrade_legacy(&mut conn)?;
    run_migrations(&mut conn)?;
    upgrade::stamp_version(&mut conn)?;

    Ok(conn)
}

/// Run any pending Diesel migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DbError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration {
            cause: e.to_string(),
        })?;
    if !applied.is_empty() {
        info!("Applied {} notes database migration(s)", applied.len());
    }
    Ok(())
}

pub mod assets;
pub mod books;
pub mod cross_refs;
pub mod highlights;
pub mod models;
pub mod notes;
mod schema;
mod upgrade;
pub mod verse_store;

pub use books::{BookEntry, Testament, Vocabulary};
pub use cross_refs::CrossReferenceStore;
pub use verse_store::{Translation, VerseSource, VerseStore};

#[cfg(test)]
pub(crate) fn test_notes_db() -> SqliteConnection {
    open_notes_db(":memory:").unwrap()
}
