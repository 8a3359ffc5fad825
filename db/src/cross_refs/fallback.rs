//! A small built-in table of well-known cross references, used when the
//! cross reference database has nothing for a verse. Book names are English;
//! the snippets are the Telugu wording shown in the reader.
use crate::books;
use crate::models::{CrossReference, CrossReferenceTarget, RelationKind, VerseCoordinate};

use crate::models::RelationKind::*;

struct Target {
    book: &'static str,
    chapter: i32,
    verse: i32,
    text: &'static str,
    kind: RelationKind,
}

struct Entry {
    book: &'static str,
    chapter: i32,
    verse: i32,
    text: &'static str,
    targets: &'static [Target],
}

const fn t(
    book: &'static str,
    chapter: i32,
    verse: i32,
    text: &'static str,
    kind: RelationKind,
) -> Target {
    Target {
        book,
        chapter,
        verse,
        text,
        kind,
    }
}

const fn e(
    book: &'static str,
    chapter: i32,
    verse: i32,
    text: &'static str,
    targets: &'static [Target],
) -> Entry {
    Entry {
        book,
        chapter,
        verse,
        text,
        targets,
    }
}

static ENTRIES: &[Entry] = &[
    e("Genesis", 1, 1, "ప్రారంభమందు దేవుడు ఆకాశమును భూమిని సృష్టించెను", &[
        t("John", 1, 1, "ప్రారంభమందు వాక్యము ఉండెను", Parallel),
        t("Psalms", 33, 6, "యెహోవా వాక్యముచేత ఆకాశములు సృజింపబడెను", Quotation),
        t("Psalms", 102, 25, "నీవు పూర్వకాలమందు భూమి స్థాపించితివి", Theme),
    ]),
    e("Genesis", 1, 26, "దేవుడు మనవంటి మనుష్యులను చేయుదము", &[
        t("James", 3, 9, "దేవుని సారూప్యముగా సృష్టింపబడిన మనుష్యులను", Quotation),
        t("1 Corinthians", 11, 7, "దేవుని ప్రతిమగాను మహిమగాను ఉన్నవాడు", Allusion),
    ]),
    e("Genesis", 3, 15, "ఆమె సంతానమును నీ తలను నలగగొట్టును", &[
        t("Galatians", 4, 4, "స్త్రీ సంతానమైన క్రీస్తు", Fulfillment),
        t("Romans", 16, 20, "శీఘ్రముగా సాతానును మీ కింద చితికగొట్టును", Fulfillment),
    ]),
    e("Genesis", 12, 3, "నీవు దీవెనవాడవు", &[
        t("Galatians", 3, 8, "అబ్రాహామునందు దీవెనలు పొందెదరు", Fulfillment),
        t("Luke", 1, 55, "అబ్రాహాము సంతానమునకు", Quotation),
    ]),
    e("Exodus", 3, 14, "నేను ఉన్నవాడనై ఉన్నవాడను", &[
        t("John", 8, 58, "నేను ఉన్నవాడనై ఉన్నవాడను", Quotation),
        t("John", 18, 6, "నేను ఉన్నవాడనై ఉన్నవాడను", Quotation),
    ]),
    e("Psalms", 22, 1, "నా దేవా, నా దేవా, నన్ను ఎందుకు విడిచితివి", &[
        t("Matthew", 27, 46, "నా దేవా, నా దేవా, నన్ను ఎందుకు విడిచితివి", Quotation),
        t("Mark", 15, 34, "నా దేవా, నా దేవా, నన్ను ఎందుకు విడిచితివి", Quotation),
    ]),
    e("Psalms", 22, 18, "వారు నా వస్త్రములను వారిలో పంచుకొని", &[
        t("John", 19, 24, "వారు నా వస్త్రములను వారిలో పంచుకొని", Fulfillment),
    ]),
    e("Isaiah", 7, 14, "కన్య గర్భవతియై కుమారుని కనును", &[
        t("Matthew", 1, 23, "కన్య గర్భవతియై కుమారుని కనును", Fulfillment),
        t("Luke", 1, 31, "మరియా గర్భవతియై కుమారుని కనును", Fulfillment),
    ]),
    e("Isaiah", 9, 6, "అద్భుత సలహాకుడు, బలవంతుడైన దేవుడు", &[
        t("Luke", 2, 11, "దావీదు పట్టణమందు మీకొరకు క్రీస్తు ప్రభువు జన్మించెను", Fulfillment),
    ]),
    e("Isaiah", 53, 3, "అతడు తిరస్కరింపబడి మనుష్యులచే నిరాకరింపబడెను", &[
        t("John", 1, 11, "తనవారు అతనిని స్వీకరించలేదు", Fulfillment),
        t("Matthew", 27, 39, "తిరస్కరించుచు తలలు ఊపిరి", Fulfillment),
    ]),
    e("Isaiah", 53, 5, "మన అపరాధములనిమిత్తము అతడు గాయపడెను", &[
        t("1 Peter", 2, 24, "మన పాపములను తన శరీరముమీద ధరించెను", Fulfillment),
    ]),
    e("Jeremiah", 31, 31, "నేను ఇశ్రాయేలు వంశముతోను యూదా వంశముతోను క్రొత్త నిబంధన చేసెదను", &[
        t("Luke", 22, 20, "ఈ పాత్ర నా రక్తముతో క్రొత్త నిబంధన", Fulfillment),
        t("Hebrews", 8, 8, "క్రొత్త నిబంధన చేయుదును", Quotation),
    ]),
    e("Daniel", 9, 25, "మెస్సీయ ప్రభువు వచ్చెదవు", &[
        t("Luke", 19, 38, "ప్రభువు నామమున వచ్చు రాజు", Fulfillment),
    ]),
    e("Micah", 5, 2, "బేత్లెహేములో నీకొరకు ఒకడు నాకు బయలుదేరును", &[
        t("Matthew", 2, 6, "బేత్లెహేములో నీకొరకు ఒకడు నాకు బయలుదేరును", Fulfillment),
    ]),
    e("Zechariah", 9, 9, "నీవు గాడిదపై ఎక్కి వచ్చెదవు", &[
        t("Matthew", 21, 5, "నీవు గాడిదపై ఎక్కి వచ్చెదవు", Fulfillment),
        t("John", 12, 15, "గాడిదపై ఎక్కి వచ్చెదవు", Fulfillment),
    ]),
    e("Malachi", 3, 1, "నా దూతను పంపెదను", &[
        t("Matthew", 11, 10, "నా దూతను పంపెదను", Quotation),
        t("Mark", 1, 2, "నా దూతను పంపెదను", Quotation),
    ]),
    e("Matthew", 1, 23, "అతని పేరు ఇమ్మానువేలు", &[
        t("Isaiah", 7, 14, "అతని పేరు ఇమ్మానువేలు", Prophecy),
    ]),
    e("Matthew", 2, 6, "బేత్లెహేములో నీకొరకు ఒకడు నాకు బయలుదేరును", &[
        t("Micah", 5, 2, "బేత్లెహేములో నీకొరకు ఒకడు నాకు బయలుదేరును", Prophecy),
    ]),
    e("John", 1, 1, "ప్రారంభమందు వాక్యము ఉండెను", &[
        t("Genesis", 1, 1, "ప్రారంభమందు దేవుడు ఆకాశమును భూమిని సృష్టించెను", Parallel),
    ]),
    e("John", 3, 16, "దేవుడు లోకమును ఎంతో ప్రేమించెను", &[
        t("1 John", 4, 9, "దేవుడు తన ఏకైక కుమారుని లోకములో పంపెను", Theme),
    ]),
    e("Romans", 3, 23, "అందరును పాపము చేసి దేవుని మహిమకు తప్పిపోయిరి", &[
        t("1 John", 1, 8, "మనకు పాపము లేదని చెప్పుకొంటే", Theme),
    ]),
    e("Romans", 6, 23, "పాపమునకు వేతనము మరణము", &[
        t("James", 1, 15, "పాపము పరిపక్వమై మరణమును కనుక్కొనును", Theme),
    ]),
    e("1 Corinthians", 15, 3, "క్రీస్తు మన పాపములనిమిత్తము మరణించెను", &[
        t("Isaiah", 53, 5, "మన అపరాధములనిమిత్తము అతడు గాయపడెను", Prophecy),
        t("Jonah", 1, 17, "మూడు రాత్రులు మూడు పగళ్లు", Allusion),
    ]),
    e("Revelation", 21, 1, "క్రొత్త ఆకాశమును క్రొత్త భూమిని చూచితిని", &[
        t("Isaiah", 65, 17, "క్రొత్త ఆకాశమును క్రొత్త భూమిని సృష్టించెదను", Prophecy),
        t("2 Peter", 3, 13, "నీతి నివసించు క్రొత్త ఆకాశములు", Theme),
    ]),
];

impl Entry {
    fn to_cross_reference(&self) -> CrossReference {
        CrossReference {
            source: VerseCoordinate::new(self.book, self.chapter, self.verse),
            targets: self
                .targets
                .iter()
                .map(|t| CrossReferenceTarget {
                    coordinate: VerseCoordinate::new(t.book, t.chapter, t.verse),
                    text: t.text.to_string(),
                    kind: t.kind,
                })
                .collect(),
        }
    }
}

fn english_name(book: &str) -> Option<&'static str> {
    books::translate(book, books::Vocabulary::English)
}

/// Looks up the built-in references of a verse. The book may be given in
/// any vocabulary; the result uses English names.
pub fn lookup(coordinate: &VerseCoordinate) -> Option<CrossReference> {
    let book = english_name(&coordinate.book)?;
    ENTRIES
        .iter()
        .find(|e| e.book == book && e.chapter == coordinate.chapter && e.verse == coordinate.verse)
        .map(Entry::to_cross_reference)
}

/// The Telugu wording of a verse that has built-in references.
pub fn source_text(coordinate: &VerseCoordinate) -> Option<&'static str> {
    let book = english_name(&coordinate.book)?;
    ENTRIES
        .iter()
        .find(|e| e.book == book && e.chapter == coordinate.chapter && e.verse == coordinate.verse)
        .map(|e| e.text)
}

/// Gets every built-in reference out of a chapter, ordered by verse.
pub fn chapter(book: &str, chapter: i32) -> Vec<CrossReference> {
    let book = match english_name(book) {
        Some(book) => book,
        None => return vec![],
    };
    let mut found: Vec<&Entry> = ENTRIES
        .iter()
        .filter(|e| e.book == book && e.chapter == chapter)
        .collect();
    found.sort_by_key(|e| e.verse);
    found.into_iter().map(Entry::to_cross_reference).collect()
}
