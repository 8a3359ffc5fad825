//! Read-only access to the bundled Bible databases.
//!
//! The bundled files have shipped with a few different layouts over time, so
//! every lookup walks an ordered list of query variants and takes the first
//! one that returns rows. Nothing here fails: a lookup that finds nothing is
//! logged and answered with an empty result or a default, and a store whose
//! file cannot be opened still answers chapter and verse listings so the
//! reader can navigate.
use std::fmt;
use std::path::Path;

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Nullable, Text};
use log::{debug, info, warn};

use crate::books::{self, Vocabulary};
use crate::models::{Reference, Verse};

/// Chapter count assumed for any book when the database gives no answer.
pub const DEFAULT_CHAPTERS: i32 = 50;

/// Verse count assumed for any chapter when the database gives no answer.
pub const DEFAULT_VERSES: i32 = 30;

/// The bundled translations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Translation {
    Kjv,
    Telugu,
}

impl Translation {
    /// File name of the bundled database.
    pub fn file_name(self) -> &'static str {
        match self {
            Translation::Kjv => "KJV.db",
            Translation::Telugu => "bsi_te.db",
        }
    }

    /// Vocabulary the database uses for book names.
    pub fn vocabulary(self) -> Vocabulary {
        match self {
            Translation::Kjv => Vocabulary::Kjv,
            Translation::Telugu => Vocabulary::Telugu,
        }
    }

    fn variants(self) -> &'static [Variant] {
        match self {
            Translation::Kjv => &KJV_VARIANTS,
            Translation::Telugu => &TELUGU_VARIANTS,
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Translation::Kjv => write!(f, "KJV"),
            Translation::Telugu => write!(f, "Telugu"),
        }
    }
}

/// Where the verses live.
#[derive(Clone, Copy, Debug)]
enum Layout {
    /// A book table `(id, name)` and a verse table
    /// `(book_id, chapter, verse, text)`.
    Joined {
        books: &'static str,
        verses: &'static str,
    },
    /// A single table `(b, c, v, t)` keyed by book name.
    Flat { verses: &'static str },
}

/// How a stored book name is compared with the requested one.
#[derive(Clone, Copy, Debug, PartialEq)]
enum NameMatch {
    Exact,
    Lower,
    Upper,
    Trim,
}

impl NameMatch {
    fn predicate(self, column: &str) -> String {
        match self {
            NameMatch::Exact => format!("{column} = ?"),
            NameMatch::Lower => format!("LOWER({column}) = LOWER(?)"),
            NameMatch::Upper => format!("UPPER({column}) = UPPER(?)"),
            NameMatch::Trim => format!("TRIM({column}) = TRIM(?)"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Variant {
    layout: Layout,
    name_match: NameMatch,
}

const fn joined(books: &'static str, verses: &'static str, name_match: NameMatch) -> Variant {
    Variant {
        layout: Layout::Joined { books, verses },
        name_match,
    }
}

const fn flat(verses: &'static str, name_match: NameMatch) -> Variant {
    Variant {
        layout: Layout::Flat { verses },
        name_match,
    }
}

const KJV_VARIANTS: [Variant; 6] = [
    joined("KJV_books", "KJV_verses", NameMatch::Exact),
    joined("KJV_books", "KJV_verses", NameMatch::Lower),
    joined("KJV_books", "KJV_verses", NameMatch::Upper),
    joined("KJV_books", "KJV_verses", NameMatch::Trim),
    joined("kjv_books", "kjv_verses", NameMatch::Exact),
    joined("books", "verses", NameMatch::Exact),
];

const TELUGU_VARIANTS: [Variant; 3] = [
    flat("verse", NameMatch::Exact),
    flat("verse", NameMatch::Trim),
    flat("verses", NameMatch::Exact),
];

impl Variant {
    fn table(&self) -> &'static str {
        match self.layout {
            Layout::Joined { verses, .. } | Layout::Flat { verses } => verses,
        }
    }

    /// Column names for chapter, verse and text.
    fn columns(&self) -> (&'static str, &'static str, &'static str) {
        match self.layout {
            Layout::Joined { .. } => ("chapter", "verse", "text"),
            Layout::Flat { .. } => ("c", "v", "t"),
        }
    }

    /// `WHERE` clause selecting one book; binds the book name.
    fn book_filter(&self) -> String {
        match self.layout {
            Layout::Joined { books, .. } => format!(
                "book_id = (SELECT id FROM {books} WHERE {})",
                self.name_match.predicate("name")
            ),
            Layout::Flat { .. } => self.name_match.predicate("b"),
        }
    }

    fn books_sql(&self) -> String {
        match self.layout {
            Layout::Joined { books, .. } => format!("SELECT name FROM {books} ORDER BY id"),
            Layout::Flat { verses } => {
                format!("SELECT b AS name FROM {verses} GROUP BY b ORDER BY MIN(rowid)")
            }
        }
    }

    fn chapters_sql(&self) -> String {
        let (c, _, _) = self.columns();
        format!(
            "SELECT DISTINCT {c} AS number FROM {} WHERE {} ORDER BY {c}",
            self.table(),
            self.book_filter()
        )
    }

    fn verse_numbers_sql(&self) -> String {
        let (c, v, _) = self.columns();
        format!(
            "SELECT DISTINCT {v} AS number FROM {} WHERE {} AND {c} = ? ORDER BY {v}",
            self.table(),
            self.book_filter()
        )
    }

    fn chapter_sql(&self) -> String {
        let (c, v, t) = self.columns();
        format!(
            "SELECT {v} AS number, {t} AS words FROM {} WHERE {} AND {c} = ? ORDER BY {v}",
            self.table(),
            self.book_filter()
        )
    }

    fn verse_sql(&self) -> String {
        let (c, v, t) = self.columns();
        format!(
            "SELECT {t} AS words FROM {} WHERE {} AND {c} = ? AND {v} = ?",
            self.table(),
            self.book_filter()
        )
    }

    fn book_id_sql(&self) -> Option<String> {
        match self.layout {
            Layout::Joined { books, .. } => Some(format!(
                "SELECT id AS number FROM {books} WHERE {}",
                self.name_match.predicate("name")
            )),
            Layout::Flat { .. } => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.layout {
            Layout::Joined { books, verses } => {
                write!(f, "{books}/{verses} ({:?} name)", self.name_match)
            }
            Layout::Flat { verses } => write!(f, "{verses} ({:?} name)", self.name_match),
        }
    }
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct NumberRow {
    #[diesel(sql_type = Integer)]
    number: i32,
}

#[derive(QueryableByName)]
struct VerseRow {
    #[diesel(sql_type = Integer)]
    number: i32,
    #[diesel(sql_type = Text)]
    words: String,
}

#[derive(QueryableByName)]
struct WordsRow {
    #[diesel(sql_type = Nullable<Text>)]
    words: Option<String>,
}

/// Anything that can produce the text of a single verse.
pub trait VerseSource {
    /// Looks up the text of one verse. `book` may be in any vocabulary.
    fn verse_text(&mut self, book: &str, chapter: i32, verse: i32) -> Option<String>;
}

/// One bundled translation database.
pub struct VerseStore {
    translation: Translation,
    conn: Option<SqliteConnection>,
}

impl VerseStore {
    /// Opens the database at `path`. A missing or unopenable file gives a
    /// store that answers from defaults.
    pub fn open(path: impl AsRef<Path>, translation: Translation) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            warn!(
                "{} database {} is missing, using defaults",
                translation,
                path.display()
            );
            return Self::degraded(translation);
        }

        match SqliteConnection::establish(&path.to_string_lossy()) {
            Ok(conn) => {
                info!("Opened {} database {}", translation, path.display());
                VerseStore {
                    translation,
                    conn: Some(conn),
                }
            }
            Err(e) => {
                warn!(
                    "Could not open {} database {}: {}, using defaults",
                    translation,
                    path.display(),
                    e
                );
                Self::degraded(translation)
            }
        }
    }

    /// A store with no database behind it.
    pub fn degraded(translation: Translation) -> Self {
        VerseStore {
            translation,
            conn: None,
        }
    }

    pub fn translation(&self) -> Translation {
        self.translation
    }

    pub fn is_degraded(&self) -> bool {
        self.conn.is_none()
    }

    /// Spells `book` the way this store's database does.
    fn stored_name(&self, book: &str) -> String {
        books::translate_or_passthrough(book, self.translation.vocabulary())
    }

    /// Runs `run` for each query variant in order and returns the first
    /// non-empty result.
    fn first_hit<T>(
        &mut self,
        what: &str,
        mut run: impl FnMut(&mut SqliteConnection, &Variant) -> QueryResult<Vec<T>>,
    ) -> Option<Vec<T>> {
        let translation = self.translation;
        let conn = self.conn.as_mut()?;

        for variant in translation.variants() {
            match run(conn, variant) {
                Ok(rows) if !rows.is_empty() => {
                    debug!("{what}: answered by {variant}");
                    return Some(rows);
                }
                Ok(_) => debug!("{what}: no rows from {variant}"),
                Err(e) => debug!("{what}: {variant} failed: {e}"),
            }
        }
        None
    }

    /// Gets every book name in the database, in the database's order.
    pub fn books(&mut self) -> Vec<String> {
        let found = self.first_hit("books", |conn, variant| {
            if variant.name_match != NameMatch::Exact {
                return Ok(vec![]);
            }
            sql_query(variant.books_sql()).load::<NameRow>(conn)
        });

        match found {
            Some(rows) => rows.into_iter().map(|r| r.name).collect(),
            None => {
                warn!("No book list in the {} database, using the book table", self.translation);
                books::all(self.translation.vocabulary())
                    .into_iter()
                    .map(String::from)
                    .collect()
            }
        }
    }

    /// Gets the chapter numbers of a book.
    pub fn chapters(&mut self, book: &str) -> Vec<i32> {
        let name = self.stored_name(book);
        let found = self.first_hit("chapters", |conn, variant| {
            sql_query(variant.chapters_sql())
                .bind::<Text, _>(&name)
                .load::<NumberRow>(conn)
        });

        match found {
            Some(rows) => rows.into_iter().map(|r| r.number).collect(),
            None => {
                warn!("No chapters found for '{}', assuming {}", name, DEFAULT_CHAPTERS);
                (1..=DEFAULT_CHAPTERS).collect()
            }
        }
    }

    /// Gets the verse numbers of a chapter.
    pub fn verse_numbers(&mut self, book: &str, chapter: i32) -> Vec<i32> {
        let name = self.stored_name(book);
        let found = self.first_hit("verse numbers", |conn, variant| {
            sql_query(variant.verse_numbers_sql())
                .bind::<Text, _>(&name)
                .bind::<Integer, _>(chapter)
                .load::<NumberRow>(conn)
        });

        match found {
            Some(rows) => rows.into_iter().map(|r| r.number).collect(),
            None => {
                warn!(
                    "No verses found for '{} {}', assuming {}",
                    name, chapter, DEFAULT_VERSES
                );
                (1..=DEFAULT_VERSES).collect()
            }
        }
    }

    /// Gets every verse of a chapter, or nothing when the chapter is unknown.
    pub fn chapter(&mut self, book: &str, chapter: i32) -> Vec<Verse> {
        let name = self.stored_name(book);
        let found = self.first_hit("chapter", |conn, variant| {
            sql_query(variant.chapter_sql())
                .bind::<Text, _>(&name)
                .bind::<Integer, _>(chapter)
                .load::<VerseRow>(conn)
        });

        match found {
            Some(rows) => rows
                .into_iter()
                .map(|r| Verse {
                    book: name.clone(),
                    chapter,
                    verse: r.number,
                    words: r.words,
                })
                .collect(),
            None => {
                warn!("No text found for '{} {}'", name, chapter);
                vec![]
            }
        }
    }

    /// Gets the verses a reference points at: the whole chapter, or the
    /// verses of the range that exist.
    pub fn passage(&mut self, reference: &Reference) -> Vec<Verse> {
        let mut verses = self.chapter(&reference.book, reference.chapter);
        if let Some(range) = &reference.verses {
            verses.retain(|v| range.contains(&v.verse));
        }
        verses
    }

    /// Gets the numbers of the verses a reference points at, leaving out
    /// any part of its range past the end of the chapter.
    pub fn existing_verses(&mut self, reference: &Reference) -> Vec<i32> {
        let mut numbers = self.verse_numbers(&reference.book, reference.chapter);
        if let Some(range) = &reference.verses {
            numbers.retain(|n| range.contains(n));
        }
        numbers
    }

    /// Gets the text of one verse.
    pub fn verse_text(&mut self, book: &str, chapter: i32, verse: i32) -> Option<String> {
        let name = self.stored_name(book);
        let found = self.first_hit("verse text", |conn, variant| {
            let rows = sql_query(variant.verse_sql())
                .bind::<Text, _>(&name)
                .bind::<Integer, _>(chapter)
                .bind::<Integer, _>(verse)
                .load::<WordsRow>(conn)?;
            Ok(rows
                .into_iter()
                .filter_map(|r| r.words)
                .filter(|w| !w.is_empty())
                .collect())
        });

        match found {
            Some(mut rows) => Some(rows.swap_remove(0)),
            None => {
                if let Some(conn) = self.conn.as_mut() {
                    warn!(
                        "No text for '{} {}:{}' in the {} database",
                        name, chapter, verse, self.translation
                    );
                    log_tables(conn);
                }
                None
            }
        }
    }

    /// Gets the text of one verse, or a placeholder naming the verse.
    pub fn verse_text_or_placeholder(&mut self, book: &str, chapter: i32, verse: i32) -> String {
        self.verse_text(book, chapter, verse)
            .unwrap_or_else(|| format!("Verse not available ({book} {chapter}:{verse})"))
    }

    /// Gets the database id of a book. Only databases with a separate book
    /// table have one.
    pub fn book_id(&mut self, book: &str) -> Option<i32> {
        let name = self.stored_name(book);
        self.first_hit("book id", |conn, variant| match variant.book_id_sql() {
            Some(sql) => sql_query(sql).bind::<Text, _>(&name).load::<NumberRow>(conn),
            None => Ok(vec![]),
        })
        .map(|rows| rows[0].number)
    }
}

impl VerseSource for VerseStore {
    fn verse_text(&mut self, book: &str, chapter: i32, verse: i32) -> Option<String> {
        VerseStore::verse_text(self, book, chapter, verse)
    }
}

/// Logs the tables of a database that did not answer a lookup.
fn log_tables(conn: &mut SqliteConnection) {
    match sql_query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .load::<NameRow>(conn)
    {
        Ok(tables) => {
            let names: Vec<String> = tables.into_iter().map(|t| t.name).collect();
            debug!("Available tables: {}", names.join(", "));
        }
        Err(e) => debug!("Could not list tables: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::establish_connection;
    use tempfile::TempDir;

    fn execute_all(path: &Path, statements: &[&str]) {
        let mut conn = establish_connection(&path.to_string_lossy()).unwrap();
        for stmt in statements {
            sql_query(*stmt).execute(&mut conn).unwrap();
        }
    }

    /// A KJV database with the current layout and a handful of verses.
    fn kjv_fixture() -> (TempDir, VerseStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("KJV.db");
        execute_all(
            &path,
            &[
                "CREATE TABLE KJV_books (id INTEGER PRIMARY KEY, name TEXT)",
                "CREATE TABLE KJV_verses (id INTEGER PRIMARY KEY, book_id INTEGER, \
                 chapter INTEGER, verse INTEGER, text TEXT)",
                "INSERT INTO KJV_books VALUES (1, 'Genesis'), (9, 'I Samuel'), (43, 'JOHN')",
                "INSERT INTO KJV_verses (book_id, chapter, verse, text) VALUES \
                 (1, 1, 1, 'In the beginning God created the heaven and the earth.'), \
                 (1, 1, 2, 'And the earth was without form, and void;'), \
                 (1, 2, 1, 'Thus the heavens and the earth were finished,'), \
                 (9, 3, 10, 'Speak; for thy servant heareth.'), \
                 (43, 3, 16, 'For God so loved the world, that he gave his only begotten Son,')",
            ],
        );
        let store = VerseStore::open(&path, Translation::Kjv);
        (dir, store)
    }

    #[test]
    fn exact_stored_text() {
        let (_dir, mut store) = kjv_fixture();
        assert!(!store.is_degraded());
        assert_eq!(
            store.verse_text("Genesis", 1, 1).as_deref(),
            Some("In the beginning God created the heaven and the earth.")
        );
        // English names are respelled for the KJV tables
        assert_eq!(
            store.verse_text("1 Samuel", 3, 10).as_deref(),
            Some("Speak; for thy servant heareth.")
        );
        // Upper-cased book names are found by a later variant
        assert_eq!(
            store.verse_text("John", 3, 16).as_deref(),
            Some("For God so loved the world, that he gave his only begotten Son,")
        );
    }

    #[test]
    fn listings() {
        let (_dir, mut store) = kjv_fixture();
        assert_eq!(store.books(), vec!["Genesis", "I Samuel", "JOHN"]);
        assert_eq!(store.chapters("Genesis"), vec![1, 2]);
        assert_eq!(store.verse_numbers("Genesis", 1), vec![1, 2]);
        assert_eq!(store.book_id("1 Samuel"), Some(9));

        let chapter = store.chapter("Genesis", 1);
        assert_eq!(chapter.len(), 2);
        assert_eq!(chapter[1].verse, 2);
        assert_eq!(chapter[1].book, "Genesis");
    }

    #[test]
    fn passage_filters_range() {
        let (_dir, mut store) = kjv_fixture();
        let verses = store.passage(&"Genesis 1:2-5".parse().unwrap());
        assert_eq!(verses.iter().map(|v| v.verse).collect::<Vec<_>>(), vec![2]);
        assert_eq!(store.passage(&"Genesis 1".parse().unwrap()).len(), 2);
    }

    #[test]
    fn existing_verses_stop_at_chapter_end() {
        let (_dir, mut store) = kjv_fixture();
        assert_eq!(store.existing_verses(&"Genesis 1:1-40".parse().unwrap()), vec![1, 2]);
        assert_eq!(store.existing_verses(&"Genesis 1:2".parse().unwrap()), vec![2]);
        assert!(store.existing_verses(&"Genesis 1:3-999".parse().unwrap()).is_empty());
        assert_eq!(store.existing_verses(&"Genesis 1".parse().unwrap()), vec![1, 2]);
    }

    #[test]
    fn unknown_verse() {
        let (_dir, mut store) = kjv_fixture();
        assert_eq!(store.verse_text("Genesis", 1, 99), None);
        assert_eq!(
            store.verse_text_or_placeholder("Genesis", 1, 99),
            "Verse not available (Genesis 1:99)"
        );
        assert!(store.chapter("Exodus", 1).is_empty());
        assert_eq!(store.chapters("Exodus").len(), DEFAULT_CHAPTERS as usize);
    }

    #[test]
    fn legacy_table_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("KJV.db");
        execute_all(
            &path,
            &[
                "CREATE TABLE books (id INTEGER PRIMARY KEY, name TEXT)",
                "CREATE TABLE verses (id INTEGER PRIMARY KEY, book_id INTEGER, \
                 chapter INTEGER, verse INTEGER, text TEXT)",
                "INSERT INTO books VALUES (66, 'Revelation of John')",
                "INSERT INTO verses (book_id, chapter, verse, text) VALUES \
                 (66, 22, 21, 'The grace of our Lord Jesus Christ be with you all. Amen.')",
            ],
        );
        let mut store = VerseStore::open(&path, Translation::Kjv);
        assert_eq!(
            store.verse_text("Revelation", 22, 21).as_deref(),
            Some("The grace of our Lord Jesus Christ be with you all. Amen.")
        );
    }

    #[test]
    fn telugu_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bsi_te.db");
        execute_all(
            &path,
            &[
                "CREATE TABLE verse (b TEXT, c INTEGER, v INTEGER, t TEXT)",
                "INSERT INTO verse VALUES \
                 ('ఆదికాండము', 1, 1, 'ఆదియందు దేవుడు భూమ్యాకాశములను సృజించెను.'), \
                 ('యోహాను సువార్త', 3, 16, 'దేవుడు లోకమును ఎంతో ప్రేమించెను.')",
            ],
        );
        let mut store = VerseStore::open(&path, Translation::Telugu);
        assert_eq!(store.books(), vec!["ఆదికాండము", "యోహాను సువార్త"]);
        assert_eq!(
            store.verse_text("John", 3, 16).as_deref(),
            Some("దేవుడు లోకమును ఎంతో ప్రేమించెను.")
        );
        assert_eq!(
            store.verse_text("యోహాను సువార్త", 3, 16).as_deref(),
            Some("దేవుడు లోకమును ఎంతో ప్రేమించెను.")
        );
        assert_eq!(store.book_id("John"), None);
    }

    #[test]
    fn degraded_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("KJV.db");
        let mut store = VerseStore::open(&path, Translation::Kjv);

        assert!(store.is_degraded());
        assert!(!path.exists());
        assert_eq!(store.chapters("Genesis"), (1..=50).collect::<Vec<_>>());
        assert_eq!(store.verse_numbers("Genesis", 1), (1..=30).collect::<Vec<_>>());
        assert_eq!(store.books().len(), 66);
        assert_eq!(store.books()[8], "I Samuel");
        assert!(store.chapter("Genesis", 1).is_empty());
        assert_eq!(
            store.verse_text_or_placeholder("John", 3, 16),
            "Verse not available (John 3:16)"
        );
    }

    #[test]
    fn empty_file_is_not_degraded_but_answers_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("KJV.db");
        std::fs::write(&path, b"").unwrap();
        let mut store = VerseStore::open(&path, Translation::Kjv);
        assert_eq!(store.verse_numbers("Ruth", 1).len(), DEFAULT_VERSES as usize);
        assert_eq!(store.verse_text("Ruth", 1, 16), None);
    }
}
