pub use self::auto::*;

// Lives in the bundled, read-only cross_references.db, never in the notes
// database. SQLite's rowid stands in for the missing primary key.
table! {
    cross_references (rowid) {
        rowid -> Integer,
        source_book -> Text,
        source_chapter -> Integer,
        source_verse -> Integer,
        reference_book -> Text,
        reference_chapter -> Integer,
        reference_verse -> Integer,
    }
}

mod auto;
