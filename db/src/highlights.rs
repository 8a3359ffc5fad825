//! Per-verse highlight colors. A verse has at most one highlight; setting a
//! new color replaces the old one.
use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::models::{Highlight, HighlightColor, HighlightRow, NewHighlight, VerseCoordinate};
use crate::schema::verse_highlights as vh;
use crate::DbError;

/// Sets the color of a verse, replacing any earlier highlight.
pub fn set_highlight(
    conn: &mut SqliteConnection,
    coordinate: &VerseCoordinate,
    color: HighlightColor,
) -> Result<(), DbError> {
    diesel::insert_into(vh::table)
        .values(&NewHighlight {
            book_name: &coordinate.book,
            chapter: coordinate.chapter,
            verse: coordinate.verse,
            color: color.to_db(),
        })
        .on_conflict((vh::book_name, vh::chapter, vh::verse))
        .do_update()
        .set(vh::color.eq(excluded(vh::color)))
        .execute(conn)?;
    Ok(())
}

/// Gets the color of a verse, or [HighlightColor::NONE] if it has none.
pub fn highlight_color(
    conn: &mut SqliteConnection,
    coordinate: &VerseCoordinate,
) -> Result<HighlightColor, DbError> {
    let color = vh::table
        .filter(vh::book_name.eq(&coordinate.book))
        .filter(vh::chapter.eq(coordinate.chapter))
        .filter(vh::verse.eq(coordinate.verse))
        .select(vh::color)
        .first::<i32>(conn)
        .optional()?;

    Ok(color.map(HighlightColor::from_db).unwrap_or_default())
}

/// Gets every highlight in a chapter, ordered by verse.
pub fn chapter_highlights(
    conn: &mut SqliteConnection,
    book: &str,
    chapter: i32,
) -> Result<Vec<Highlight>, DbError> {
    let rows: Vec<HighlightRow> = vh::table
        .filter(vh::book_name.eq(book))
        .filter(vh::chapter.eq(chapter))
        .order_by(vh::verse.asc())
        .select(HighlightRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Highlight::from).collect())
}

/// Removes the highlight of a verse. Returns whether there was one.
pub fn clear_highlight(
    conn: &mut SqliteConnection,
    coordinate: &VerseCoordinate,
) -> Result<bool, DbError> {
    let deleted = diesel::delete(
        vh::table
            .filter(vh::book_name.eq(&coordinate.book))
            .filter(vh::chapter.eq(coordinate.chapter))
            .filter(vh::verse.eq(coordinate.verse)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_notes_db;

    fn row_count(conn: &mut SqliteConnection) -> i64 {
        vh::table.count().get_result(conn).unwrap()
    }

    #[test]
    fn set_is_idempotent() {
        let mut conn = test_notes_db();
        let coord = VerseCoordinate::new("John", 3, 16);

        set_highlight(&mut conn, &coord, HighlightColor::YELLOW).unwrap();
        set_highlight(&mut conn, &coord, HighlightColor::YELLOW).unwrap();

        assert_eq!(row_count(&mut conn), 1);
        assert_eq!(highlight_color(&mut conn, &coord).unwrap(), HighlightColor::YELLOW);
    }

    #[test]
    fn set_overwrites_color() {
        let mut conn = test_notes_db();
        let coord = VerseCoordinate::new("Psalms", 23, 1);

        set_highlight(&mut conn, &coord, HighlightColor::GREEN).unwrap();
        set_highlight(&mut conn, &coord, HighlightColor::PINK).unwrap();

        assert_eq!(row_count(&mut conn), 1);
        assert_eq!(highlight_color(&mut conn, &coord).unwrap(), HighlightColor::PINK);
    }

    #[test]
    fn unhighlighted_verse_is_none() {
        let mut conn = test_notes_db();
        let coord = VerseCoordinate::new("Ruth", 1, 16);
        assert_eq!(highlight_color(&mut conn, &coord).unwrap(), HighlightColor::NONE);
        assert!(!clear_highlight(&mut conn, &coord).unwrap());
    }

    #[test]
    fn chapter_listing_and_clear() {
        let mut conn = test_notes_db();
        for (verse, color) in [(5, HighlightColor::CYAN), (2, HighlightColor::ORANGE)] {
            set_highlight(&mut conn, &VerseCoordinate::new("Romans", 8, verse), color).unwrap();
        }
        set_highlight(
            &mut conn,
            &VerseCoordinate::new("Romans", 9, 1),
            HighlightColor::YELLOW,
        )
        .unwrap();

        let listed = chapter_highlights(&mut conn, "Romans", 8).unwrap();
        assert_eq!(
            listed.iter().map(|h| (h.coordinate.verse, h.color)).collect::<Vec<_>>(),
            vec![(2, HighlightColor::ORANGE), (5, HighlightColor::CYAN)]
        );

        assert!(clear_highlight(&mut conn, &VerseCoordinate::new("Romans", 8, 2)).unwrap());
        assert_eq!(chapter_highlights(&mut conn, "Romans", 8).unwrap().len(), 1);
    }
}
