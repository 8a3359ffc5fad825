use serde_derive::Serialize;

use crate::schema::{notes, verse_references};

/// A note row without its verses.
#[derive(Clone, Debug, PartialEq, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = notes)]
pub struct NoteHeader {
    pub id: i32,
    pub title: String,
}

/// A verse attached to a note. The text is a snapshot taken when the verse
/// was added, in whichever language the reader was using at the time.
#[derive(
    Clone, Debug, PartialEq, Queryable, Identifiable, Associations, Selectable, Serialize,
)]
#[diesel(belongs_to(NoteHeader, foreign_key = note_id))]
#[diesel(table_name = verse_references)]
pub struct NoteVerse {
    pub id: i32,
    pub note_id: i32,
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub verse_text: String,
    #[diesel(column_name = is_english_mode)]
    pub is_english: bool,
}

/// A note with every verse attached to it, in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub verses: Vec<NoteVerse>,
}

impl Note {
    pub(crate) fn assemble(header: NoteHeader, verses: Vec<NoteVerse>) -> Self {
        Note {
            id: header.id,
            title: header.title,
            verses,
        }
    }
}

/// A verse to attach to a note.
#[derive(Clone, Debug, PartialEq)]
pub struct NewNoteVerse {
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub verse_text: String,
    pub is_english: bool,
}

#[derive(Insertable)]
#[diesel(table_name = notes)]
pub(crate) struct NewNote<'a> {
    pub title: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = verse_references)]
pub(crate) struct NewVerseRow<'a> {
    pub note_id: i32,
    pub book_name: &'a str,
    pub chapter: i32,
    pub verse: i32,
    pub verse_text: &'a str,
    pub is_english_mode: bool,
}

impl<'a> NewVerseRow<'a> {
    pub fn new(note_id: i32, verse: &'a NewNoteVerse) -> Self {
        NewVerseRow {
            note_id,
            book_name: &verse.book_name,
            chapter: verse.chapter,
            verse: verse.verse,
            verse_text: &verse.verse_text,
            is_english_mode: verse.is_english,
        }
    }
}
