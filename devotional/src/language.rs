use std::fmt;
use std::str::FromStr;

use db::{Translation, Vocabulary};
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::prefs::Preferences;
use crate::DevotionalError;

const SELECTED_LANGUAGE: &str = "selected_language";

/// The reader's display language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Telugu,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
        }
    }

    /// The bundled translation read in this language.
    pub fn translation(self) -> Translation {
        match self {
            Language::English => Translation::Kjv,
            Language::Telugu => Translation::Telugu,
        }
    }

    /// Book names shown to a reader of this language.
    pub fn vocabulary(self) -> Vocabulary {
        match self {
            Language::English => Vocabulary::English,
            Language::Telugu => Vocabulary::Telugu,
        }
    }

    pub fn is_english(self) -> bool {
        self == Language::English
    }

    /// The stored language, English when unset or unrecognised.
    pub fn load(prefs: &Preferences) -> Self {
        match prefs.get_string(SELECTED_LANGUAGE) {
            Some(code) => code.parse().unwrap_or_else(|e| {
                warn!("{e} Falling back to English");
                Language::English
            }),
            None => Language::default(),
        }
    }

    pub fn save(self, prefs: &mut Preferences) -> Result<(), DevotionalError> {
        prefs.edit().put_string(SELECTED_LANGUAGE, self.code()).commit()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Telugu => write!(f, "తెలుగు"),
        }
    }
}

impl FromStr for Language {
    type Err = DevotionalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "te" | "telugu" | "తెలుగు" => Ok(Language::Telugu),
            _ => Err(DevotionalError::UnknownLanguage {
                code: s.to_string(),
            }),
        }
    }
}
