//! Everything around the reader that is not the text itself: key-value
//! preferences, saved prayer alarms and their scheduling, the verse of the
//! day and chapter audio.
use thiserror::Error;

pub mod alarms;
pub mod audio;
pub mod daily_verse;
pub mod language;
pub mod prefs;
pub mod reminder;
pub mod schedule;

pub use alarms::{AlarmStore, DayMask, SavedAlarm};
pub use language::Language;
pub use prefs::Preferences;
pub use reminder::{NotificationAction, Reminder, ReminderPayload, ReminderSink};
pub use schedule::{AlarmBackend, LocalBackend, Scheduler, Trigger};

#[derive(Clone, Error, Debug, PartialEq)]
pub enum DevotionalError {
    #[error("Could not read or write {}. Root cause: {:?}.", path, cause)]
    Io { path: String, cause: String },

    #[error("Alarm {} was not found.", id)]
    AlarmNotFound { id: i32 },

    #[error("'{}' is not a valid alarm: {}.", name, reason)]
    InvalidAlarm { name: String, reason: String },

    #[error("'{}' is not a valid time, expected HH:MM.", time)]
    InvalidTime { time: String },

    #[error("'{}' is not a valid day selection.", days)]
    InvalidDays { days: String },

    #[error("'{}' is not a supported language.", code)]
    UnknownLanguage { code: String },

    #[error("Request to {} failed. Root cause: {:?}.", url, cause)]
    Http { url: String, cause: String },

    #[error("Could not read the daily verse. Root cause: {:?}.", cause)]
    DailyVerse { cause: String },

    #[error("Could not register reminder {}. Root cause: {:?}.", code, cause)]
    Schedule { code: i32, cause: String },

    #[error("Book {} has no chapter {}.", book, chapter)]
    NoSuchChapter { book: i32, chapter: i32 },
}
