//! The canonical table of the 66 books and the translation between the
//! book-name vocabularies used by the bundled databases.
//!
//! The English vocabulary is the storage format shared by notes, highlights
//! and the audio catalogue. The KJV database spells numbered books with Roman
//! numerals, and the Telugu database and cross reference database use the
//! Telugu display names. Older Telugu data uses shorter spellings for some
//! books; those are accepted as aliases but never produced.
use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde_derive::Serialize;

use crate::DbError;

/// Enum for the testaments in the Bible (Old or New).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Testament {
    Old,
    New,
}

/// A family of book names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Vocabulary {
    /// Canonical English names ("1 Samuel", "Revelation").
    English,
    /// Spelling used by the KJV database ("I Samuel", "Revelation of John").
    Kjv,
    /// Telugu display names.
    Telugu,
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Vocabulary::English => write!(f, "English"),
            Vocabulary::Kjv => write!(f, "KJV"),
            Vocabulary::Telugu => write!(f, "Telugu"),
        }
    }
}

/// One row of the book table.
#[derive(Debug, PartialEq, Serialize)]
pub struct BookEntry {
    /// 1-based position in the canon, also used by the audio catalogue.
    pub number: i32,
    pub english: &'static str,
    pub kjv: &'static str,
    pub telugu: &'static str,
    #[serde(skip)]
    pub telugu_aliases: &'static [&'static str],
    pub chapters: i32,
}

impl BookEntry {
    pub fn testament(&self) -> Testament {
        if self.number <= 39 {
            Testament::Old
        } else {
            Testament::New
        }
    }

    /// This book's name in the given vocabulary.
    pub fn name(&self, vocabulary: Vocabulary) -> &'static str {
        match vocabulary {
            Vocabulary::English => self.english,
            Vocabulary::Kjv => self.kjv,
            Vocabulary::Telugu => self.telugu,
        }
    }

    fn matches(&self, name: &str) -> Option<Vocabulary> {
        if self.english.eq_ignore_ascii_case(name) {
            Some(Vocabulary::English)
        } else if self.kjv.eq_ignore_ascii_case(name) {
            Some(Vocabulary::Kjv)
        } else if self.telugu == name || self.telugu_aliases.contains(&name) {
            Some(Vocabulary::Telugu)
        } else {
            None
        }
    }
}

const fn book(
    number: i32,
    english: &'static str,
    kjv: &'static str,
    telugu: &'static str,
    telugu_aliases: &'static [&'static str],
    chapters: i32,
) -> BookEntry {
    BookEntry {
        number,
        english,
        kjv,
        telugu,
        telugu_aliases,
        chapters,
    }
}

/// Array of books indexed by their order in the Bible, including the
/// total number of chapters in that book.
pub static BOOKS: [BookEntry; 66] = [
    book(1, "Genesis", "Genesis", "ఆదికాండము", &[], 50),
    book(2, "Exodus", "Exodus", "నిర్గమకాండము", &[], 40),
    book(3, "Leviticus", "Leviticus", "లేవీయకాండము", &[], 27),
    book(4, "Numbers", "Numbers", "సంఖ్యాకాండము", &["అరణ్యకాండము"], 36),
    book(5, "Deuteronomy", "Deuteronomy", "ద్వితీయోపదేశకాండమ", &["ద్వితీయోపదేశకాండము"], 34),
    book(6, "Joshua", "Joshua", "యెహొషువ", &["యెహోషువ"], 24),
    book(7, "Judges", "Judges", "న్యాయాధిపతులు", &[], 21),
    book(8, "Ruth", "Ruth", "రూతు", &[], 4),
    book(9, "1 Samuel", "I Samuel", "సమూయేలు మొదటి గ్రంథము", &["1 సమూయేలు"], 31),
    book(10, "2 Samuel", "II Samuel", "సమూయేలు రెండవ గ్రంథము", &["2 సమూయేలు"], 24),
    book(11, "1 Kings", "I Kings", "రాజులు మొదటి గ్రంథము", &["1 రాజులు"], 22),
    book(12, "2 Kings", "II Kings", "రాజులు రెండవ గ్రంథము", &["2 రాజులు"], 25),
    book(13, "1 Chronicles", "I Chronicles", "దినవృత్తాంతములు మొదటి గ్రంథము", &["1 దినవృత్తాంతములు"], 29),
    book(14, "2 Chronicles", "II Chronicles", "దినవృత్తాంతములు రెండవ గ్రంథము", &["2 దినవృత్తాంతములు"], 36),
    book(15, "Ezra", "Ezra", "ఎజ్రా", &[], 10),
    book(16, "Nehemiah", "Nehemiah", "నెహెమ్యా", &["నెహెమీయా"], 13),
    book(17, "Esther", "Esther", "ఎస్తేరు", &[], 10),
    book(18, "Job", "Job", "యోబు గ్రంథము", &["యోబు"], 42),
    book(19, "Psalms", "Psalms", "కీర్తనల గ్రంథము", &["కీర్తనలు"], 150),
    book(20, "Proverbs", "Proverbs", "సామెతలు", &[], 31),
    book(21, "Ecclesiastes", "Ecclesiastes", "ప్రసంగి", &[], 12),
    book(22, "Song of Solomon", "Song of Solomon", "పరమగీతము", &[], 8),
    book(23, "Isaiah", "Isaiah", "యెషయా గ్రంథము", &["యెషయా"], 66),
    book(24, "Jeremiah", "Jeremiah", "యిర్మీయా", &[], 52),
    book(25, "Lamentations", "Lamentations", "విలాపవాక్యములు", &[], 5),
    book(26, "Ezekiel", "Ezekiel", "యెహెజ్కేలు", &["యెహేజ్కేలు"], 48),
    book(27, "Daniel", "Daniel", "దానియేలు", &[], 12),
    book(28, "Hosea", "Hosea", "హొషేయ", &["హోషేయ"], 14),
    book(29, "Joel", "Joel", "యోవేలు", &[], 3),
    book(30, "Amos", "Amos", "ఆమోసు", &[], 9),
    book(31, "Obadiah", "Obadiah", "ఓబద్యా", &["ఒబద్యా"], 1),
    book(32, "Jonah", "Jonah", "యోనా", &[], 4),
    book(33, "Micah", "Micah", "మీకా", &[], 7),
    book(34, "Nahum", "Nahum", "నహూము", &[], 3),
    book(35, "Habakkuk", "Habakkuk", "హబక్కూకు", &["హబకూకు"], 3),
    book(36, "Zephaniah", "Zephaniah", "జెఫన్యా", &[], 3),
    book(37, "Haggai", "Haggai", "హగ్గయి", &[], 2),
    book(38, "Zechariah", "Zechariah", "జెకర్యా", &[], 14),
    book(39, "Malachi", "Malachi", "మలాకీ", &[], 4),
    book(40, "Matthew", "Matthew", "మత్తయి సువార్త", &["మత్తయి"], 28),
    book(41, "Mark", "Mark", "మార్కు సువార్త", &["మార్కు"], 16),
    book(42, "Luke", "Luke", "లూకా సువార్త", &["లూకా"], 24),
    book(43, "John", "John", "యోహాను సువార్త", &["యోహాను"], 21),
    book(44, "Acts", "Acts", "అపొస్తలుల కార్యములు", &[], 28),
    book(45, "Romans", "Romans", "రోమీయులకు", &[], 16),
    book(46, "1 Corinthians", "I Corinthians", "1 కొరింథీయులకు", &[], 16),
    book(47, "2 Corinthians", "II Corinthians", "2 కొరింథీయులకు", &[], 13),
    book(48, "Galatians", "Galatians", "గలతీయులకు", &[], 6),
    book(49, "Ephesians", "Ephesians", "ఎఫెసీయులకు", &[], 6),
    book(50, "Philippians", "Philippians", "ఫిలిప్పీయులకు", &[], 4),
    book(51, "Colossians", "Colossians", "కొలొస్సయులకు", &[], 4),
    book(52, "1 Thessalonians", "I Thessalonians", "1 థెస్సలొనీకయులకు", &[], 5),
    book(53, "2 Thessalonians", "II Thessalonians", "2 థెస్సలొనీకయులకు", &[], 3),
    book(54, "1 Timothy", "I Timothy", "1 తిమోతికి", &[], 6),
    book(55, "2 Timothy", "II Timothy", "2 తిమోతికి", &[], 4),
    book(56, "Titus", "Titus", "తీతుకు", &[], 3),
    book(57, "Philemon", "Philemon", "ఫిలేమోనుకు", &[], 1),
    book(58, "Hebrews", "Hebrews", "హెబ్రీయులకు", &[], 13),
    book(59, "James", "James", "యాకోబు", &[], 5),
    book(60, "1 Peter", "I Peter", "1 పేతురు", &[], 5),
    book(61, "2 Peter", "II Peter", "2 పేతురు", &[], 3),
    book(62, "1 John", "I John", "1 యోహాను", &[], 5),
    book(63, "2 John", "II John", "2 యోహాను", &[], 1),
    book(64, "3 John", "III John", "3 యోహాను", &[], 1),
    book(65, "Jude", "Jude", "యూదా", &[], 1),
    book(66, "Revelation", "Revelation of John", "ప్రకటన గ్రంథము", &["ప్రకటన"], 22),
];

/// Minimum length of an abbreviation accepted by [resolve](fn.resolve.html).
const MIN_ABBREVIATION: usize = 3;

/// Checks that every vocabulary maps one-to-one onto the canon. Run once at
/// startup so a bad edit to the table fails loudly instead of silently
/// passing names through.
pub fn validate() -> Result<(), DbError> {
    let mut english = HashSet::new();
    let mut kjv = HashSet::new();
    let mut telugu = HashSet::new();

    for (i, b) in BOOKS.iter().enumerate() {
        if b.number != i as i32 + 1 {
            return Err(table_error(format!(
                "'{}' is numbered {} but sits at position {}",
                b.english,
                b.number,
                i + 1
            )));
        }
        if b.chapters < 1 {
            return Err(table_error(format!("'{}' has no chapters", b.english)));
        }
        if !english.insert(b.english.to_lowercase()) {
            return Err(table_error(format!("duplicate English name '{}'", b.english)));
        }
        if !kjv.insert(b.kjv.to_lowercase()) {
            return Err(table_error(format!("duplicate KJV name '{}'", b.kjv)));
        }
        for name in std::iter::once(&b.telugu).chain(b.telugu_aliases.iter()) {
            if !telugu.insert(*name) {
                return Err(table_error(format!("duplicate Telugu name '{name}'")));
            }
        }
    }

    // A KJV spelling may only coincide with the English name of the same book.
    for b in BOOKS.iter() {
        if let Some(other) = BOOKS
            .iter()
            .find(|o| o.number != b.number && o.english.eq_ignore_ascii_case(b.kjv))
        {
            return Err(table_error(format!(
                "KJV name '{}' collides with English '{}'",
                b.kjv, other.english
            )));
        }
    }

    Ok(())
}

fn table_error(cause: String) -> DbError {
    DbError::BookTable { cause }
}

/// Looks up a book by any of its names, returning the vocabulary the name
/// belongs to.
///
/// Matching is case-insensitive for the Latin vocabularies. As a last resort
/// an unambiguous abbreviation of the English name is accepted ("gen",
/// "1cor", "rev"), ignoring spaces.
pub fn resolve(name: &str) -> Option<(&'static BookEntry, Vocabulary)> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    BOOKS
        .iter()
        .find_map(|b| b.matches(name).map(|v| (b, v)))
        .or_else(|| by_abbreviation(name).map(|b| (b, Vocabulary::English)))
}

/// Looks up a book by any of its names.
pub fn find(name: &str) -> Option<&'static BookEntry> {
    resolve(name).map(|(b, _)| b)
}

/// Looks up a book by its 1-based canonical number.
pub fn by_number(number: i32) -> Option<&'static BookEntry> {
    if number < 1 {
        return None;
    }
    BOOKS.get(number as usize - 1)
}

fn by_abbreviation(name: &str) -> Option<&'static BookEntry> {
    let needle: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if needle.chars().count() < MIN_ABBREVIATION {
        return None;
    }

    let mut candidates = BOOKS.iter().filter(|b| {
        b.english
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
            .starts_with(&needle)
    });

    match (candidates.next(), candidates.next()) {
        (Some(b), None) => Some(b),
        _ => None,
    }
}

/// Translates a book name from any vocabulary into `to`.
pub fn translate(name: &str, to: Vocabulary) -> Option<&'static str> {
    find(name).map(|b| b.name(to))
}

/// Translates like [translate](fn.translate.html), but hands back the input
/// unchanged (and logs it) when the name is unknown.
pub fn translate_or_passthrough(name: &str, to: Vocabulary) -> String {
    match translate(name, to) {
        Some(translated) => translated.to_string(),
        None => {
            warn!("No {} name for book '{}', using it unchanged", to, name);
            name.to_string()
        }
    }
}

/// Display name (Telugu) to storage name (English).
pub fn to_storage(display_name: &str) -> Option<&'static str> {
    translate(display_name, Vocabulary::English)
}

/// Storage name (English) to display name (Telugu).
pub fn to_display(storage_name: &str) -> Option<&'static str> {
    translate(storage_name, Vocabulary::Telugu)
}

/// Every book name of a vocabulary, in canonical order.
pub fn all(vocabulary: Vocabulary) -> Vec<&'static str> {
    BOOKS.iter().map(|b| b.name(vocabulary)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent() {
        assert_eq!(validate(), Ok(()));
        assert_eq!(BOOKS.len(), 66);
        assert_eq!(BOOKS[64].english, "Jude");
    }

    #[test]
    fn display_storage_round_trip() {
        for b in BOOKS.iter() {
            let storage = to_storage(b.telugu).unwrap();
            assert_eq!(storage, b.english);
            assert_eq!(to_display(storage), Some(b.telugu));
        }
    }

    #[test]
    fn kjv_round_trip() {
        for b in BOOKS.iter() {
            let kjv = translate(b.english, Vocabulary::Kjv).unwrap();
            assert_eq!(translate(kjv, Vocabulary::English), Some(b.english));
        }
    }

    #[test]
    fn aliases_resolve_to_primary_names() {
        assert_eq!(to_storage("1 సమూయేలు"), Some("1 Samuel"));
        assert_eq!(to_storage("కీర్తనలు"), Some("Psalms"));
        assert_eq!(to_display("Psalms"), Some("కీర్తనల గ్రంథము"));
    }

    #[test]
    fn resolve_reports_vocabulary() {
        assert_eq!(resolve("II Kings").map(|(b, v)| (b.number, v)), Some((12, Vocabulary::Kjv)));
        assert_eq!(
            resolve("revelation of john").map(|(b, v)| (b.number, v)),
            Some((66, Vocabulary::Kjv))
        );
        assert_eq!(
            resolve("  genesis ").map(|(b, v)| (b.number, v)),
            Some((1, Vocabulary::English))
        );
        assert_eq!(
            resolve("యూదా").map(|(b, v)| (b.number, v)),
            Some((65, Vocabulary::Telugu))
        );
    }

    #[test]
    fn abbreviations() {
        assert_eq!(find("psa").map(|b| b.english), Some("Psalms"));
        assert_eq!(find("1cor").map(|b| b.english), Some("1 Corinthians"));
        assert_eq!(find("rev").map(|b| b.english), Some("Revelation"));
        // Philippians and Philemon
        assert_eq!(find("phil"), None);
        assert_eq!(find("ge"), None);
    }

    #[test]
    fn unknown_names() {
        assert_eq!(translate("Hezekiah", Vocabulary::Telugu), None);
        assert_eq!(translate_or_passthrough("Hezekiah", Vocabulary::Telugu), "Hezekiah");
        assert_eq!(find(""), None);
    }

    #[test]
    fn numbers_and_testaments() {
        assert_eq!(by_number(19).map(|b| b.chapters), Some(150));
        assert_eq!(by_number(0), None);
        assert_eq!(by_number(67), None);
        assert_eq!(by_number(39).unwrap().testament(), Testament::Old);
        assert_eq!(by_number(40).unwrap().testament(), Testament::New);
        assert_eq!(all(Vocabulary::Kjv)[65], "Revelation of John");
    }
}
