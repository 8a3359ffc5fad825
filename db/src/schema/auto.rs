table! {
    notes (id) {
        id -> Integer,
        title -> Text,
    }
}

table! {
    verse_references (id) {
        id -> Integer,
        note_id -> Integer,
        book_name -> Text,
        chapter -> Integer,
        verse -> Integer,
        verse_text -> Text,
        is_english_mode -> Bool,
    }
}

table! {
    verse_highlights (id) {
        id -> Integer,
        book_name -> Text,
        chapter -> Integer,
        verse -> Integer,
        color -> Integer,
    }
}

joinable!(verse_references -> notes (note_id));

allow_tables_to_appear_in_same_query!(
    notes,
    verse_references,
    verse_highlights,
);
