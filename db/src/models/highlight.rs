use std::fmt;
use std::str::FromStr;

use serde_derive::Serialize;

use crate::models::VerseCoordinate;
use crate::schema::verse_highlights;
use crate::DbError;

/// An ARGB highlight color as stored in the `color` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct HighlightColor(u32);

impl HighlightColor {
    pub const YELLOW: HighlightColor = HighlightColor(0xFFFF_FF00);
    pub const GREEN: HighlightColor = HighlightColor(0xFF00_FF00);
    pub const CYAN: HighlightColor = HighlightColor(0xFF00_FFFF);
    pub const ORANGE: HighlightColor = HighlightColor(0xFFFF_A500);
    pub const PINK: HighlightColor = HighlightColor(0xFFFF_69B4);
    pub const LIGHT_BLUE: HighlightColor = HighlightColor(0xFF87_CEEB);
    /// White, which the reader treats as "not highlighted".
    pub const NONE: HighlightColor = HighlightColor(0xFFFF_FFFF);

    /// The palette offered to readers, with the names accepted by `FromStr`.
    pub const PALETTE: [(&'static str, HighlightColor); 7] = [
        ("yellow", Self::YELLOW),
        ("green", Self::GREEN),
        ("cyan", Self::CYAN),
        ("orange", Self::ORANGE),
        ("pink", Self::PINK),
        ("light-blue", Self::LIGHT_BLUE),
        ("none", Self::NONE),
    ];

    pub const fn from_argb(argb: u32) -> Self {
        HighlightColor(argb)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn name(self) -> Option<&'static str> {
        Self::PALETTE
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(name, _)| *name)
    }

    // SQLite integers are signed; the bit pattern is what matters.
    pub(crate) fn from_db(value: i32) -> Self {
        HighlightColor(value as u32)
    }

    pub(crate) fn to_db(self) -> i32 {
        self.0 as i32
    }
}

impl Default for HighlightColor {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "#{:08X}", self.0),
        }
    }
}

impl FromStr for HighlightColor {
    type Err = DbError;

    /// Accepts a palette name ("yellow", "light blue", "white") or a hex
    /// value, `#AARRGGBB` or `#RRGGBB` (opaque).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DbError::InvalidColor {
            color: s.to_string(),
        };
        let name = s.trim().to_lowercase().replace([' ', '_'], "-");

        if let Some(hex) = name.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return match hex.len() {
                8 => Ok(HighlightColor(value)),
                6 => Ok(HighlightColor(0xFF00_0000 | value)),
                _ => Err(invalid()),
            };
        }

        match name.as_str() {
            "white" | "clear" => Ok(Self::NONE),
            "lightblue" | "blue" => Ok(Self::LIGHT_BLUE),
            _ => Self::PALETTE
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, c)| *c)
                .ok_or_else(invalid),
        }
    }
}

/// The highlight of a single verse.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Highlight {
    pub coordinate: VerseCoordinate,
    pub color: HighlightColor,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = verse_highlights)]
pub(crate) struct HighlightRow {
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub color: i32,
}

impl From<HighlightRow> for Highlight {
    fn from(row: HighlightRow) -> Self {
        Highlight {
            coordinate: VerseCoordinate::new(row.book_name, row.chapter, row.verse),
            color: HighlightColor::from_db(row.color),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = verse_highlights)]
pub(crate) struct NewHighlight<'a> {
    pub book_name: &'a str,
    pub chapter: i32,
    pub verse: i32,
    pub color: i32,
}

#[cfg(test)]
mod tests {
    use super::HighlightColor;

    #[test]
    fn parse_names_and_hex() {
        assert_eq!("yellow".parse::<HighlightColor>().unwrap(), HighlightColor::YELLOW);
        assert_eq!("Light Blue".parse::<HighlightColor>().unwrap(), HighlightColor::LIGHT_BLUE);
        assert_eq!("white".parse::<HighlightColor>().unwrap(), HighlightColor::NONE);
        assert_eq!("#FFFFA500".parse::<HighlightColor>().unwrap(), HighlightColor::ORANGE);
        assert_eq!("#ff69b4".parse::<HighlightColor>().unwrap(), HighlightColor::PINK);
        assert!("mauve".parse::<HighlightColor>().is_err());
        assert!("#12345".parse::<HighlightColor>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(HighlightColor::CYAN.to_string(), "cyan");
        assert_eq!(HighlightColor::from_argb(0x8012_3456).to_string(), "#80123456");
    }

    #[test]
    fn db_round_trip_keeps_bits() {
        let c = HighlightColor::YELLOW;
        assert!(c.to_db() < 0);
        assert_eq!(HighlightColor::from_db(c.to_db()), c);
    }
}
