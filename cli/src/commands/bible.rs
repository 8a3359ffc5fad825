use std::error::Error;

use db::highlights;
use db::models::{Reference, VerseCoordinate};

use crate::config::Config;

/// Prints a passage, marking highlighted verses.
pub fn read(config: &Config, reference: &str) -> Result<(), Box<dyn Error>> {
    let language = config.language();
    let reference: Reference = reference.parse()?;
    let entry = reference.book_entry()?;

    let mut store = config.verse_store(language);
    let verses = store.passage(&reference);
    if verses.is_empty() {
        println!("Verse not available ({reference})");
        return Ok(());
    }

    let colors = {
        let mut conn = config.notes_db()?;
        highlights::chapter_highlights(&mut conn, entry.english, reference.chapter)?
    };

    println!(
        "{}",
        Reference {
            book: entry.name(language.vocabulary()).to_string(),
            chapter: reference.chapter,
            verses: reference.verses.clone(),
        }
    );
    for v in verses {
        match colors.iter().find(|h| h.coordinate.verse == v.verse) {
            Some(h) => println!("{} {} [{}]", v.verse, v.words, h.color),
            None => println!("{} {}", v.verse, v.words),
        }
    }
    Ok(())
}

pub fn books(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut store = config.verse_store(config.language());
    for name in store.books() {
        println!("{name}");
    }
    Ok(())
}

/// Lists the chapters of a book, or the verse numbers of one chapter.
pub fn chapters(config: &Config, book: &str, chapter: Option<i32>) -> Result<(), Box<dyn Error>> {
    let mut store = config.verse_store(config.language());
    let numbers = match chapter {
        Some(chapter) => store.verse_numbers(book, chapter),
        None => store.chapters(book),
    };
    let numbers: Vec<String> = numbers.iter().map(i32::to_string).collect();
    println!("{}", numbers.join(" "));
    Ok(())
}

/// Prints the cross references of a single verse.
pub fn cross_references(config: &Config, reference: &str) -> Result<(), Box<dyn Error>> {
    let language = config.language();
    let reference: Reference = reference.parse()?;
    let entry = reference.book_entry()?;
    let verse = match &reference.verses {
        Some(range) => *range.start(),
        None => return Err(format!("'{reference}' does not name a verse").into()),
    };

    let coordinate = VerseCoordinate::new(entry.name(language.vocabulary()), reference.chapter, verse);
    let mut verses = config.verse_store(language);
    let mut store = config.cross_references();
    let found = store.references(&coordinate, language.is_english(), &mut verses);

    if found.targets.is_empty() {
        println!("No cross references for {coordinate}");
        return Ok(());
    }
    println!("{}", found.source);
    for target in found.targets {
        println!("  {} ({}) {}", target.coordinate, target.kind, target.text);
    }
    Ok(())
}
