use std::fmt;

use serde_derive::Serialize;

/// Model representing a Bible verse as read from one of the bundled
/// databases. `book` is spelled in the vocabulary of the store it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verse {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
    pub words: String,
}

/// A single verse address, e.g. "John 3:16".
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct VerseCoordinate {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
}

impl VerseCoordinate {
    pub fn new(book: impl Into<String>, chapter: i32, verse: i32) -> Self {
        VerseCoordinate {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

mod cross_reference;
mod highlight;
mod note;
mod reference;
pub use self::cross_reference::{CrossReference, CrossReferenceTarget, RelationKind};
pub use self::highlight::{Highlight, HighlightColor};
pub(crate) use self::highlight::{HighlightRow, NewHighlight};
pub use self::note::{NewNoteVerse, Note, NoteHeader, NoteVerse};
pub(crate) use self::note::{NewNote, NewVerseRow};
pub use self::reference::Reference;
