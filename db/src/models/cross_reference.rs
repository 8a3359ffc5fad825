use std::fmt;

use serde_derive::Serialize;

use crate::models::VerseCoordinate;

/// How a cross reference relates to its source verse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    Parallel,
    Quotation,
    Theme,
    Allusion,
    Fulfillment,
    Prophecy,
    /// Rows from the cross reference database carry no relation.
    Related,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            RelationKind::Parallel => "parallel",
            RelationKind::Quotation => "quotation",
            RelationKind::Theme => "theme",
            RelationKind::Allusion => "allusion",
            RelationKind::Fulfillment => "fulfillment",
            RelationKind::Prophecy => "prophecy",
            RelationKind::Related => "related",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossReferenceTarget {
    pub coordinate: VerseCoordinate,
    pub text: String,
    pub kind: RelationKind,
}

/// All references out of one verse.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossReference {
    pub source: VerseCoordinate,
    pub targets: Vec<CrossReferenceTarget>,
}
