//! Cross references from the bundled `cross_references.db`, with a small
//! built-in table for verses the database does not cover.
//!
//! The database stores every book under its Telugu display name. Readers in
//! English mode pass and receive English names; the mapping happens here.
use std::path::Path;

use diesel::prelude::*;
use log::{debug, warn};

use crate::books::{self, Vocabulary};
use crate::models::{CrossReference, CrossReferenceTarget, RelationKind, VerseCoordinate};
use crate::schema::cross_references as xr;
use crate::verse_store::VerseSource;

pub mod fallback;

/// File name of the bundled cross reference database.
pub const FILE_NAME: &str = "cross_references.db";

/// Longest target text handed back, in characters.
const MAX_TEXT_LEN: usize = 100;

pub struct CrossReferenceStore {
    conn: Option<SqliteConnection>,
}

impl CrossReferenceStore {
    /// Opens the database at `path`. A missing or unopenable file gives a
    /// store that only knows the built-in references.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            warn!("Cross reference database {} is missing", path.display());
            return Self::degraded();
        }

        match SqliteConnection::establish(&path.to_string_lossy()) {
            Ok(conn) => CrossReferenceStore { conn: Some(conn) },
            Err(e) => {
                warn!("Could not open cross references {}: {}", path.display(), e);
                Self::degraded()
            }
        }
    }

    pub fn degraded() -> Self {
        CrossReferenceStore { conn: None }
    }

    fn rows(&mut self, coordinate: &VerseCoordinate) -> Vec<(String, i32, i32)> {
        let conn = match self.conn.as_mut() {
            Some(conn) => conn,
            None => return vec![],
        };
        let book = books::translate_or_passthrough(&coordinate.book, Vocabulary::Telugu);

        xr::table
            .filter(xr::source_book.eq(&book))
            .filter(xr::source_chapter.eq(coordinate.chapter))
            .filter(xr::source_verse.eq(coordinate.verse))
            .order_by((
                xr::reference_book.asc(),
                xr::reference_chapter.asc(),
                xr::reference_verse.asc(),
            ))
            .select((xr::reference_book, xr::reference_chapter, xr::reference_verse))
            .load(conn)
            .unwrap_or_else(|e| {
                warn!(
                    "Cross reference query for {} {}:{} failed: {}",
                    book, coordinate.chapter, coordinate.verse, e
                );
                vec![]
            })
    }

    /// Gets the references out of a verse with the text of each target.
    ///
    /// With `english` set, `coordinate` and the returned targets use English
    /// book names and `verses` should be the English store; otherwise Telugu
    /// names throughout. Verses the database has nothing for are answered
    /// from the built-in table.
    pub fn references(
        &mut self,
        coordinate: &VerseCoordinate,
        english: bool,
        verses: &mut dyn VerseSource,
    ) -> CrossReference {
        let vocabulary = if english {
            Vocabulary::English
        } else {
            Vocabulary::Telugu
        };

        let rows = self.rows(coordinate);
        let targets: Vec<CrossReferenceTarget> = if rows.is_empty() {
            fallback_targets(coordinate, vocabulary, verses)
        } else {
            rows.into_iter()
                .map(|(book, chapter, verse)| {
                    let book = books::translate_or_passthrough(&book, vocabulary);
                    let text = target_text(verses, &book, chapter, verse)
                        .unwrap_or_else(|| not_found(&book, chapter, verse));
                    CrossReferenceTarget {
                        coordinate: VerseCoordinate::new(book, chapter, verse),
                        text,
                        kind: RelationKind::Related,
                    }
                })
                .collect()
        };

        debug!("Found {} cross reference(s) for {}", targets.len(), coordinate);
        CrossReference {
            source: coordinate.clone(),
            targets,
        }
    }

    /// Whether the database holds any references at all.
    pub fn has_data(&mut self) -> bool {
        self.total_references() > 0
    }

    /// Number of reference rows in the database.
    pub fn total_references(&mut self) -> i64 {
        let conn = match self.conn.as_mut() {
            Some(conn) => conn,
            None => return 0,
        };
        xr::table.count().get_result(conn).unwrap_or_else(|e| {
            warn!("Could not count cross references: {e}");
            0
        })
    }

    /// Whether the database has references out of a verse. The built-in
    /// table is not consulted.
    pub fn has_references(&mut self, coordinate: &VerseCoordinate) -> bool {
        !self.rows(coordinate).is_empty()
    }
}

fn fallback_targets(
    coordinate: &VerseCoordinate,
    vocabulary: Vocabulary,
    verses: &mut dyn VerseSource,
) -> Vec<CrossReferenceTarget> {
    let found = match fallback::lookup(coordinate) {
        Some(found) => found,
        None => return vec![],
    };

    found
        .targets
        .into_iter()
        .map(|t| {
            let VerseCoordinate {
                book,
                chapter,
                verse,
            } = t.coordinate;
            let book = books::translate_or_passthrough(&book, vocabulary);
            let text = match target_text(verses, &book, chapter, verse) {
                Some(text) => text,
                // The built-in snippets are Telugu.
                None if vocabulary == Vocabulary::Telugu => t.text,
                None => not_found(&book, chapter, verse),
            };
            CrossReferenceTarget {
                coordinate: VerseCoordinate::new(book, chapter, verse),
                text,
                kind: t.kind,
            }
        })
        .collect()
}

fn target_text(
    verses: &mut dyn VerseSource,
    book: &str,
    chapter: i32,
    verse: i32,
) -> Option<String> {
    verses
        .verse_text(book, chapter, verse)
        .filter(|text| !text.is_empty())
        .map(truncate)
}

fn not_found(book: &str, chapter: i32, verse: i32) -> String {
    format!("Verse not found: {book} {chapter}:{verse}")
}

/// Shortens text longer than 100 characters to 97 followed by "...".
fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_TEXT_LEN {
        return text;
    }
    let mut short: String = text.chars().take(MAX_TEXT_LEN - 3).collect();
    short.push_str("...");
    short
}
