use std::error::Error;

use db::models::{HighlightColor, NewNoteVerse, Note, Reference, VerseCoordinate};
use db::{highlights, notes, DbConnection, VerseStore};
use devotional::Language;

use crate::config::Config;

/// The verses of `reference` that exist in `store`. A range running past
/// the end of the chapter is cut short; one naming no verse is an error.
fn existing_verses(
    store: &mut VerseStore,
    reference: &Reference,
) -> Result<Vec<i32>, Box<dyn Error>> {
    let numbers = store.existing_verses(reference);
    if numbers.is_empty() {
        let translation = store.translation();
        return Err(format!("'{reference}' names no verse in the {translation} Bible").into());
    }
    Ok(numbers)
}

/// The verses a reference points at, captured in the current language.
fn note_verses(config: &Config, reference: &str) -> Result<Vec<NewNoteVerse>, Box<dyn Error>> {
    let language = config.language();
    let reference: Reference = reference.parse()?;
    let entry = reference.book_entry()?;
    let book_name = entry.name(language.vocabulary());

    let mut store = config.verse_store(language);
    let numbers = existing_verses(&mut store, &reference)?;

    Ok(numbers
        .into_iter()
        .map(|verse| NewNoteVerse {
            book_name: book_name.to_string(),
            chapter: reference.chapter,
            verse,
            verse_text: store.verse_text_or_placeholder(book_name, reference.chapter, verse),
            is_english: language.is_english(),
        })
        .collect())
}

fn print_note(note: &Note) {
    println!("#{} {}", note.id, note.title);
    for v in &note.verses {
        println!(
            "  [{}] {} {}:{} {}",
            v.id, v.book_name, v.chapter, v.verse, v.verse_text
        );
    }
}

pub fn create(config: &Config, title: &str, references: &[String]) -> Result<(), Box<dyn Error>> {
    let mut verses = Vec::new();
    for reference in references {
        verses.extend(note_verses(config, reference)?);
    }
    let note = notes::create_note(&mut config.notes_db()?, title, &verses)?;
    print_note(&note);
    Ok(())
}

pub fn list(config: &Config) -> Result<(), Box<dyn Error>> {
    let all = notes::all_notes(&mut config.notes_db()?)?;
    if all.is_empty() {
        println!("No notes yet");
    }
    for note in all {
        println!("#{} {} ({} verses)", note.id, note.title, note.verses.len());
    }
    Ok(())
}

pub fn show(config: &Config, id: i32) -> Result<(), Box<dyn Error>> {
    print_note(&notes::note(&mut config.notes_db()?, id)?);
    Ok(())
}

pub fn add(config: &Config, id: i32, reference: &str) -> Result<(), Box<dyn Error>> {
    let verses = note_verses(config, reference)?;
    let mut conn = config.notes_db()?;
    for verse in &verses {
        notes::add_verse(&mut conn, id, verse)?;
    }
    print_note(&notes::note(&mut conn, id)?);
    Ok(())
}

pub fn rename(config: &Config, id: i32, title: &str) -> Result<(), Box<dyn Error>> {
    notes::rename_note(&mut config.notes_db()?, id, title)?;
    Ok(())
}

pub fn delete(config: &Config, id: i32) -> Result<(), Box<dyn Error>> {
    notes::delete_note(&mut config.notes_db()?, id)?;
    println!("Deleted note #{id}");
    Ok(())
}

pub fn remove_verse(config: &Config, verse_id: i32) -> Result<(), Box<dyn Error>> {
    notes::delete_verse(&mut config.notes_db()?, verse_id)?;
    Ok(())
}

/// Highlights are keyed by the English book name whatever the language, and
/// only verses the English Bible has can be highlighted.
fn coordinates(
    config: &Config,
    reference: &str,
) -> Result<Vec<VerseCoordinate>, Box<dyn Error>> {
    let reference: Reference = reference.parse()?;
    let entry = reference.book_entry()?;
    if reference.verses.is_none() {
        return Err(format!("'{reference}' does not name a verse").into());
    }

    let mut store = config.verse_store(Language::English);
    Ok(existing_verses(&mut store, &reference)?
        .into_iter()
        .map(|verse| VerseCoordinate::new(entry.english, reference.chapter, verse))
        .collect())
}

pub fn highlight(config: &Config, reference: &str, color: &str) -> Result<(), Box<dyn Error>> {
    let color: HighlightColor = color.parse()?;
    let mut conn: DbConnection = config.notes_db()?;
    for coordinate in coordinates(config, reference)? {
        if color.is_none() {
            highlights::clear_highlight(&mut conn, &coordinate)?;
        } else {
            highlights::set_highlight(&mut conn, &coordinate, color)?;
        }
    }
    Ok(())
}

/// Prints the highlight of a verse, or every highlight of a chapter.
pub fn show_highlights(config: &Config, reference: &str) -> Result<(), Box<dyn Error>> {
    let mut conn = config.notes_db()?;
    let parsed: Reference = reference.parse()?;
    if parsed.verses.is_none() {
        let entry = parsed.book_entry()?;
        for h in highlights::chapter_highlights(&mut conn, entry.english, parsed.chapter)? {
            println!("{} {}", h.coordinate, h.color);
        }
        return Ok(());
    }

    for coordinate in coordinates(config, reference)? {
        let color = highlights::highlight_color(&mut conn, &coordinate)?;
        println!("{coordinate} {color}");
    }
    Ok(())
}

pub fn clear_highlight(config: &Config, reference: &str) -> Result<(), Box<dyn Error>> {
    let mut conn = config.notes_db()?;
    let mut cleared = 0;
    for coordinate in coordinates(config, reference)? {
        if highlights::clear_highlight(&mut conn, &coordinate)? {
            cleared += 1;
        }
    }
    println!("Cleared {cleared} highlight(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;
    use diesel::sql_query;
    use tempfile::TempDir;

    /// A data directory whose KJV database has John 3:35-36 only.
    fn config() -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(db::Translation::Kjv.file_name());
        let mut conn = db::establish_connection(&path.to_string_lossy()).unwrap();
        for stmt in [
            "CREATE TABLE KJV_books (id INTEGER PRIMARY KEY, name TEXT)",
            "CREATE TABLE KJV_verses (id INTEGER PRIMARY KEY, book_id INTEGER, \
             chapter INTEGER, verse INTEGER, text TEXT)",
            "INSERT INTO KJV_books VALUES (43, 'John')",
            "INSERT INTO KJV_verses (book_id, chapter, verse, text) VALUES \
             (43, 3, 35, 'The Father loveth the Son,'), \
             (43, 3, 36, 'He that believeth on the Son hath everlasting life:')",
        ] {
            sql_query(stmt).execute(&mut conn).unwrap();
        }

        let config = Config {
            assets: dir.path().to_path_buf(),
            data: dir.path().to_path_buf(),
            notes_db: Some(":memory:".to_string()),
            daily_verse_url: devotional::daily_verse::DEFAULT_URL.to_string(),
            lang: Some(Language::English),
        };
        (dir, config)
    }

    #[test]
    fn note_range_stops_at_chapter_end() {
        let (_dir, config) = config();
        let verses = note_verses(&config, "John 3:35-40").unwrap();
        let numbers: Vec<i32> = verses.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![35, 36]);
        assert_eq!(verses[0].verse_text, "The Father loveth the Son,");
        assert!(verses.iter().all(|v| v.book_name == "John" && v.is_english));

        assert!(note_verses(&config, "John 3:37-40").is_err());
    }

    #[test]
    fn highlight_range_stops_at_chapter_end() {
        let (_dir, config) = config();
        let found = coordinates(&config, "John 3:1-999").unwrap();
        assert_eq!(
            found,
            vec![
                VerseCoordinate::new("John", 3, 35),
                VerseCoordinate::new("John", 3, 36)
            ]
        );
        assert!(coordinates(&config, "John 3").is_err());
    }
}
