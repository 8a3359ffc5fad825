//! Saved prayer alarms.
//!
//! Alarms live in the `saved_alarms` preferences as flat keys
//! (`alarm_count`, `alarm_{i}_name`, `alarm_{i}_time`, `alarm_{i}_days`,
//! `alarm_{i}_active`). An alarm's id is its index, so deleting one moves
//! every later alarm down by one.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use log::{info, warn};
use serde_derive::Serialize;

use crate::prefs::{Preferences, SAVED_ALARMS};
use crate::DevotionalError;

/// Most alarms that can be saved. Their reminder codes
/// ([request_code](crate::schedule::request_code)) then stay below the
/// snooze codes.
pub const MAX_ALARMS: i32 = 100;

const ALARM_COUNT: &str = "alarm_count";
const TIME_FORMAT: &str = "%H:%M";
const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A set of weekdays. Bit 0 is Sunday, bit 6 Saturday.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DayMask(u8);

impl DayMask {
    pub const NONE: DayMask = DayMask(0);
    pub const ALL: DayMask = DayMask(0b111_1111);
    pub const WEEKDAYS: DayMask = DayMask(0b011_1110);
    pub const WEEKENDS: DayMask = DayMask(0b100_0001);

    pub fn from_bits(bits: u8) -> Self {
        DayMask(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `day` (0 = Sunday) is selected.
    pub fn contains(self, day: u8) -> bool {
        day < 7 && self.0 & (1 << day) != 0
    }

    pub fn contains_weekday(self, weekday: Weekday) -> bool {
        self.contains(weekday.num_days_from_sunday() as u8)
    }

    pub fn with(self, day: u8, selected: bool) -> Self {
        if day >= 7 {
            return self;
        }
        if selected {
            DayMask(self.0 | 1 << day)
        } else {
            DayMask(self.0 & !(1 << day))
        }
    }

    /// Selected days, Sunday first.
    pub fn days(self) -> impl Iterator<Item = u8> {
        (0..7).filter(move |d| self.contains(*d))
    }

    /// "Sun, Wed, Fri" or "No days selected".
    pub fn days_text(self) -> String {
        if self.is_empty() {
            return "No days selected".to_string();
        }
        self.days()
            .map(|d| DAY_NAMES[d as usize])
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for DayMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for DayMask {
    /// The stored form: seven '0'/'1' characters, Sunday first.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: String = (0..7)
            .map(|d| if self.contains(d) { '1' } else { '0' })
            .collect();
        write!(f, "{s}")
    }
}

impl FromStr for DayMask {
    type Err = DevotionalError;

    /// Parses the stored form, a preset ("all", "weekdays", "weekends"), or
    /// a comma separated list of day names ("mon,wed,fri").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DevotionalError::InvalidDays {
            days: s.to_string(),
        };
        let s = s.trim();

        if s.len() == 7 && s.chars().all(|c| c == '0' || c == '1') {
            return Ok(s
                .chars()
                .enumerate()
                .fold(DayMask::NONE, |mask, (d, c)| mask.with(d as u8, c == '1')));
        }

        match s.to_lowercase().as_str() {
            "all" | "daily" => Ok(DayMask::ALL),
            "weekdays" => Ok(DayMask::WEEKDAYS),
            "weekends" => Ok(DayMask::WEEKENDS),
            list => list.split(',').try_fold(DayMask::NONE, |mask, name| {
                let name = name.trim();
                DAY_NAMES
                    .iter()
                    .position(|d| name.get(..3).map_or(false, |n| d.eq_ignore_ascii_case(n)))
                    .map(|d| mask.with(d as u8, true))
                    .ok_or_else(invalid)
            }),
        }
    }
}

/// A saved prayer alarm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SavedAlarm {
    pub id: i32,
    pub name: String,
    pub time: NaiveTime,
    pub days: DayMask,
    pub active: bool,
}

impl SavedAlarm {
    pub fn time_text(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

pub fn parse_time(time: &str) -> Result<NaiveTime, DevotionalError> {
    NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|_| DevotionalError::InvalidTime {
        time: time.to_string(),
    })
}

fn key(id: i32, field: &str) -> String {
    format!("alarm_{id}_{field}")
}

fn validate(name: &str, days: DayMask) -> Result<(), DevotionalError> {
    if name.trim().is_empty() {
        return Err(DevotionalError::InvalidAlarm {
            name: name.to_string(),
            reason: "the name is empty".to_string(),
        });
    }
    if days.is_empty() {
        return Err(DevotionalError::InvalidAlarm {
            name: name.to_string(),
            reason: "no days are selected".to_string(),
        });
    }
    Ok(())
}

pub struct AlarmStore {
    prefs: Preferences,
}

impl AlarmStore {
    pub fn open(dir: &Path) -> Self {
        AlarmStore {
            prefs: Preferences::open(dir, SAVED_ALARMS),
        }
    }

    fn count(&self) -> i32 {
        self.prefs.i64_or(ALARM_COUNT, 0) as i32
    }

    fn read(&self, id: i32) -> Option<SavedAlarm> {
        let name = self.prefs.get_string(&key(id, "name"))?;
        let raw_time = self.prefs.get_string(&key(id, "time"))?;
        let time = match parse_time(&raw_time) {
            Ok(time) => time,
            Err(e) => {
                warn!("Skipping alarm {id}: {e}");
                return None;
            }
        };
        let days = self
            .prefs
            .string_or(&key(id, "days"), "1111111")
            .parse()
            .unwrap_or_else(|e| {
                warn!("Alarm {id}: {e} Using every day");
                DayMask::ALL
            });

        Some(SavedAlarm {
            id,
            name,
            time,
            days,
            active: self.prefs.bool_or(&key(id, "active"), true),
        })
    }

    /// Every readable alarm, in id order.
    pub fn list(&self) -> Vec<SavedAlarm> {
        (0..self.count()).filter_map(|id| self.read(id)).collect()
    }

    pub fn get(&self, id: i32) -> Result<SavedAlarm, DevotionalError> {
        if id < 0 || id >= self.count() {
            return Err(DevotionalError::AlarmNotFound { id });
        }
        self.read(id).ok_or(DevotionalError::AlarmNotFound { id })
    }

    /// Saves a new, active alarm.
    pub fn add(
        &mut self,
        name: &str,
        time: NaiveTime,
        days: DayMask,
    ) -> Result<SavedAlarm, DevotionalError> {
        validate(name, days)?;
        let id = self.count();
        if id >= MAX_ALARMS {
            return Err(DevotionalError::InvalidAlarm {
                name: name.to_string(),
                reason: format!("no more than {MAX_ALARMS} alarms can be saved"),
            });
        }
        let name = name.trim();

        self.prefs
            .edit()
            .put_string(&key(id, "name"), name)
            .put_string(&key(id, "time"), &time.format(TIME_FORMAT).to_string())
            .put_string(&key(id, "days"), &days.to_string())
            .put_bool(&key(id, "active"), true)
            .put_i64(ALARM_COUNT, i64::from(id) + 1)
            .commit()?;

        info!("Saved alarm {id} '{name}'");
        self.get(id)
    }

    /// Replaces the name, time and days of an alarm. Its active flag is kept.
    pub fn update(
        &mut self,
        id: i32,
        name: &str,
        time: NaiveTime,
        days: DayMask,
    ) -> Result<SavedAlarm, DevotionalError> {
        self.get(id)?;
        validate(name, days)?;

        self.prefs
            .edit()
            .put_string(&key(id, "name"), name.trim())
            .put_string(&key(id, "time"), &time.format(TIME_FORMAT).to_string())
            .put_string(&key(id, "days"), &days.to_string())
            .commit()?;
        self.get(id)
    }

    pub fn set_active(&mut self, id: i32, active: bool) -> Result<SavedAlarm, DevotionalError> {
        self.get(id)?;
        self.prefs
            .edit()
            .put_bool(&key(id, "active"), active)
            .commit()?;
        self.get(id)
    }

    /// Deletes an alarm and moves every later alarm down one id.
    pub fn delete(&mut self, id: i32) -> Result<SavedAlarm, DevotionalError> {
        let deleted = self.get(id)?;
        let count = self.count();
        let fields = ["name", "time", "days", "active"];

        // Values of every later alarm, read before the editor borrows the prefs.
        let moved: Vec<(i32, &str, Option<String>, Option<bool>)> = (id + 1..count)
            .flat_map(|i| fields.iter().map(move |f| (i, *f)))
            .map(|(i, field)| {
                let from = key(i, field);
                (i, field, self.prefs.get_string(&from), self.prefs.get_bool(&from))
            })
            .collect();

        let mut edit = self.prefs.edit();
        for field in fields {
            edit = edit.remove(&key(id, field));
        }
        for (i, field, text, flag) in moved {
            let to = key(i - 1, field);
            edit = match (text, flag) {
                (Some(text), _) => edit.put_string(&to, &text),
                (None, Some(flag)) => edit.put_bool(&to, flag),
                (None, None) => edit.remove(&to),
            };
            edit = edit.remove(&key(i, field));
        }
        edit.put_i64(ALARM_COUNT, i64::from(count) - 1).commit()?;

        info!("Deleted alarm {id} '{}'", deleted.name);
        Ok(deleted)
    }
}
