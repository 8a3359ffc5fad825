//! Notes and the verses attached to them, stored in the writable notes
//! database opened with [open_notes_db](../fn.open_notes_db.html).
use diesel::prelude::*;
use diesel::result::Error;
use log::{debug, info};

use crate::models::{NewNote, NewNoteVerse, NewVerseRow, Note, NoteHeader, NoteVerse};
use crate::schema::{notes, verse_references};
use crate::DbError;

fn note_not_found(id: i32) -> impl FnOnce(Error) -> DbError {
    move |e| match e {
        Error::NotFound => DbError::NoteNotFound { id },
        e => DbError::Other {
            cause: e.to_string(),
        },
    }
}

/// Creates a note together with its verses. Either everything is written or
/// nothing is.
pub fn create_note(
    conn: &mut SqliteConnection,
    title: &str,
    verses: &[NewNoteVerse],
) -> Result<Note, DbError> {
    let note = conn.transaction::<_, Error, _>(|conn| {
        let header: NoteHeader = diesel::insert_into(notes::table)
            .values(&NewNote { title })
            .returning(NoteHeader::as_returning())
            .get_result(conn)?;

        let verses = verses
            .iter()
            .map(|v| {
                diesel::insert_into(verse_references::table)
                    .values(&NewVerseRow::new(header.id, v))
                    .returning(NoteVerse::as_returning())
                    .get_result(conn)
            })
            .collect::<Result<Vec<NoteVerse>, Error>>()?;

        Ok(Note::assemble(header, verses))
    })?;

    info!("Created note {} with {} verse(s)", note.id, note.verses.len());
    Ok(note)
}

/// Attaches one more verse to an existing note.
pub fn add_verse(
    conn: &mut SqliteConnection,
    note_id: i32,
    verse: &NewNoteVerse,
) -> Result<NoteVerse, DbError> {
    conn.transaction::<_, Error, _>(|conn| {
        notes::table
            .find(note_id)
            .select(notes::id)
            .first::<i32>(conn)?;

        diesel::insert_into(verse_references::table)
            .values(&NewVerseRow::new(note_id, verse))
            .returning(NoteVerse::as_returning())
            .get_result(conn)
    })
    .map_err(note_not_found(note_id))
}

/// Gets every note, newest first, with its verses.
pub fn all_notes(conn: &mut SqliteConnection) -> Result<Vec<Note>, DbError> {
    let headers: Vec<NoteHeader> = notes::table
        .order_by(notes::id.desc())
        .select(NoteHeader::as_select())
        .load(conn)?;

    let verses: Vec<NoteVerse> = NoteVerse::belonging_to(&headers)
        .order_by(verse_references::id.asc())
        .select(NoteVerse::as_select())
        .load(conn)?;

    Ok(verses
        .grouped_by(&headers)
        .into_iter()
        .zip(headers)
        .map(|(verses, header)| Note::assemble(header, verses))
        .collect())
}

/// Gets a single note with its verses.
pub fn note(conn: &mut SqliteConnection, id: i32) -> Result<Note, DbError> {
    let header: NoteHeader = notes::table
        .find(id)
        .select(NoteHeader::as_select())
        .first(conn)
        .map_err(note_not_found(id))?;

    let verses: Vec<NoteVerse> = NoteVerse::belonging_to(&header)
        .order_by(verse_references::id.asc())
        .select(NoteVerse::as_select())
        .load(conn)?;

    Ok(Note::assemble(header, verses))
}

pub fn rename_note(conn: &mut SqliteConnection, id: i32, title: &str) -> Result<(), DbError> {
    let updated = diesel::update(notes::table.find(id))
        .set(notes::title.eq(title))
        .execute(conn)?;
    if updated == 0 {
        return Err(DbError::NoteNotFound { id });
    }
    Ok(())
}

/// Deletes a note. Its verses go with it through the foreign key cascade.
pub fn delete_note(conn: &mut SqliteConnection, id: i32) -> Result<(), DbError> {
    let deleted = diesel::delete(notes::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(DbError::NoteNotFound { id });
    }
    debug!("Deleted note {id}");
    Ok(())
}

/// Detaches a single verse from its note.
pub fn delete_verse(conn: &mut SqliteConnection, id: i32) -> Result<(), DbError> {
    let deleted = diesel::delete(verse_references::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(DbError::VerseReferenceNotFound { id });
    }
    Ok(())
}
