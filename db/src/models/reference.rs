use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Match, Regex};
use serde_derive::Serialize;

use crate::books::{self, BookEntry};
use crate::DbError;

/// Model representing a Bible reference used to look up a
/// passage in the database.
///
/// The book is kept as typed; it may be in any vocabulary or an
/// abbreviation. Use [book_entry](#method.book_entry) to resolve it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reference {
    pub book: String,
    pub chapter: i32,
    pub verses: Option<RangeInclusive<i32>>,
}

impl Reference {
    /// Resolves the typed book name against the book table.
    pub fn book_entry(&self) -> Result<&'static BookEntry, DbError> {
        books::find(&self.book).ok_or_else(|| DbError::BookNotFound {
            book: self.book.clone(),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reference {
                book,
                chapter,
                verses: None,
            } => write!(f, "{} {}", book, chapter),
            Reference {
                book,
                chapter,
                verses: Some(verses),
            } => {
                if verses.start() == verses.end() {
                    write!(f, "{} {}:{}", book, chapter, verses.start())
                } else {
                    write!(f, "{} {}:{}-{}", book, chapter, verses.start(), verses.end())
                }
            }
        }
    }
}

impl FromStr for Reference {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Reference, Self::Err> {
        lazy_static! {
            static ref REF_RE: Regex =
                Regex::new(r"^(\S.*?)(?:\.| )([0-9][0-9\-:\.]*)$").unwrap();
            static ref CV_RE: Regex =
                Regex::new(r"^(\d{1,3})(?:[:\.](\d{1,3})?(?:-(\d{1,3}))?)?$").unwrap();
        }

        let s = s.trim();
        let ref_caps = REF_RE.captures(s).ok_or_else(|| invalid_reference(s))?;
        match (ref_caps.get(1), ref_caps.get(2)) {
            // Book and chapter/verse reference
            (Some(book), Some(cv)) => {
                let cv_caps = CV_RE
                    .captures(cv.as_str())
                    .ok_or_else(|| invalid_reference(s))?;
                let book = book.as_str().trim().to_string();

                match (cv_caps.get(1), cv_caps.get(2), cv_caps.get(3)) {
                    // Chapter only
                    (Some(chapter), None, None) => Ok(Reference {
                        book,
                        chapter: parse_num_match(chapter)?,
                        verses: None,
                    }),
                    // Chapter and one verse
                    (Some(chapter), Some(verse), None) => {
                        let verse = parse_num_match(verse)?;
                        Ok(Reference {
                            book,
                            chapter: parse_num_match(chapter)?,
                            verses: Some(verse..=verse),
                        })
                    }
                    // Chapter with more than one verse
                    (Some(chapter), Some(verse_start), Some(verse_end)) => {
                        let verse_start = parse_num_match(verse_start)?;
                        let verse_end = parse_num_match(verse_end)?;
                        if verse_end < verse_start {
                            return Err(invalid_reference(s));
                        }
                        Ok(Reference {
                            book,
                            chapter: parse_num_match(chapter)?,
                            verses: Some(verse_start..=verse_end),
                        })
                    }
                    _ => Err(invalid_reference(s)),
                }
            }
            _ => Err(invalid_reference(s)),
        }
    }
}

/// Parse a [Match](regex.Match.html) into an i32.
fn parse_num_match(m: Match) -> Result<i32, DbError> {
    m.as_str().parse().map_err(|_| DbError::InvalidReference {
        reference: m.as_str().to_string(),
    })
}

/// Create an invalid reference error from the input.
fn invalid_reference(s: &str) -> DbError {
    DbError::InvalidReference {
        reference: s.to_string(),
    }
}
