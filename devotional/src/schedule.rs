//! Turning saved alarms into registered reminders.
//!
//! Each selected day of an alarm gets its own weekly trigger, identified by
//! a request code derived from the alarm id and the day. Saving an alarm
//! always cancels all seven codes first, so edits never leave stale
//! triggers behind.
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use log::{debug, info, warn};

use crate::alarms::SavedAlarm;
use crate::reminder::ReminderPayload;
use crate::DevotionalError;

/// Request code of the trigger for `day` (0 = Sunday) of an alarm. Ids
/// below [MAX_ALARMS](crate::alarms::MAX_ALARMS) give codes under 1000,
/// clear of every [snooze_code].
pub fn request_code(alarm_id: i32, day: u8) -> i32 {
    alarm_id * 10 + i32::from(day)
}

/// Request code of a snooze of `minutes`.
pub fn snooze_code(minutes: i64) -> i32 {
    1000 + minutes as i32
}

/// The next instant at `time` on `day` (0 = Sunday) after `now`. Today
/// counts only while `time` is still ahead; otherwise it is a week out.
pub fn next_fire(time: NaiveTime, day: u8, now: NaiveDateTime) -> NaiveDateTime {
    let current = now.weekday().num_days_from_sunday() as i64;
    let mut days_until = (i64::from(day % 7) - current + 7) % 7;
    if days_until == 0 && time <= now.time() {
        days_until = 7;
    }
    (now.date() + Duration::days(days_until)).and_time(time)
}

/// When an alarm will next fire, if it is active.
pub fn next_occurrence(alarm: &SavedAlarm, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !alarm.active {
        return None;
    }
    alarm.days.days().map(|d| next_fire(alarm.time, d, now)).min()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    pub code: i32,
    pub at: NaiveDateTime,
    pub repeat: Option<Duration>,
    pub exact: bool,
    pub payload: ReminderPayload,
}

/// The facility that actually wakes the device up.
pub trait AlarmBackend {
    /// Registers `trigger`, replacing any trigger with the same code.
    fn register(&mut self, trigger: Trigger) -> Result<(), DevotionalError>;

    fn cancel(&mut self, code: i32);

    fn can_schedule_exact(&self) -> bool;
}

pub struct Scheduler<B> {
    backend: B,
}

impl<B: AlarmBackend> Scheduler<B> {
    pub fn new(backend: B) -> Self {
        Scheduler { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Registers an alarm's weekly triggers and returns their first firing
    /// times, earliest first. An inactive alarm is only cancelled.
    pub fn schedule(
        &mut self,
        alarm: &SavedAlarm,
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, DevotionalError> {
        self.cancel(alarm.id);
        if !alarm.active {
            debug!("Alarm {} is inactive, nothing registered", alarm.id);
            return Ok(vec![]);
        }

        let exact = self.backend.can_schedule_exact();
        if !exact {
            warn!("Exact alarms are unavailable, alarm {} may fire late", alarm.id);
        }

        let mut fires = Vec::new();
        for day in alarm.days.days() {
            let at = next_fire(alarm.time, day, now);
            self.backend.register(Trigger {
                code: request_code(alarm.id, day),
                at,
                repeat: Some(Duration::weeks(1)),
                exact,
                payload: ReminderPayload::new(Some(alarm.id), Some(&alarm.name), alarm.time),
            })?;
            fires.push(at);
        }
        fires.sort();

        info!(
            "Scheduled alarm {} '{}' for {}",
            alarm.id,
            alarm.name,
            alarm.days.days_text()
        );
        Ok(fires)
    }

    /// Cancels every day's trigger of an alarm.
    pub fn cancel(&mut self, alarm_id: i32) {
        for day in 0..7 {
            self.backend.cancel(request_code(alarm_id, day));
        }
    }

    /// Registers a one-shot reminder `minutes` from `now`.
    pub fn snooze(
        &mut self,
        payload: &ReminderPayload,
        minutes: i64,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime, DevotionalError> {
        let at = now + Duration::minutes(minutes);
        self.backend.register(Trigger {
            code: snooze_code(minutes),
            at,
            repeat: None,
            exact: self.backend.can_schedule_exact(),
            payload: payload.clone(),
        })?;
        info!("Snoozed '{}' for {} minutes", payload.name, minutes);
        Ok(at)
    }
}

/// Triggers kept in process, fired by [watch](crate::reminder::watch).
#[derive(Debug, Default)]
pub struct LocalBackend {
    exact: bool,
    triggers: HashMap<i32, Trigger>,
}

impl LocalBackend {
    pub fn new(exact: bool) -> Self {
        LocalBackend {
            exact,
            triggers: HashMap::new(),
        }
    }

    pub fn get(&self, code: i32) -> Option<&Trigger> {
        self.triggers.get(&code)
    }

    /// Registered triggers, soonest first.
    pub fn triggers(&self) -> Vec<&Trigger> {
        let mut triggers: Vec<&Trigger> = self.triggers.values().collect();
        triggers.sort_by_key(|t| (t.at, t.code));
        triggers
    }

    pub fn next_at(&self) -> Option<NaiveDateTime> {
        self.triggers.values().map(|t| t.at).min()
    }

    /// Takes every trigger due at `now`, soonest first. Repeating triggers
    /// stay registered, moved to their next firing after `now`.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<Trigger> {
        let mut codes: Vec<i32> = self
            .triggers
            .values()
            .filter(|t| t.at <= now)
            .map(|t| t.code)
            .collect();
        codes.sort();

        let mut due = Vec::with_capacity(codes.len());
        for code in codes {
            let trigger = match self.triggers.remove(&code) {
                Some(trigger) => trigger,
                None => continue,
            };
            if let Some(repeat) = trigger.repeat.filter(|r| *r > Duration::zero()) {
                let mut next = trigger.clone();
                while next.at <= now {
                    next.at += repeat;
                }
                self.triggers.insert(code, next);
            }
            due.push(trigger);
        }
        due.sort_by_key(|t| (t.at, t.code));
        due
    }
}

impl AlarmBackend for LocalBackend {
    fn register(&mut self, trigger: Trigger) -> Result<(), DevotionalError> {
        debug!("Registering reminder {} at {}", trigger.code, trigger.at);
        self.triggers.insert(trigger.code, trigger);
        Ok(())
    }

    fn cancel(&mut self, code: i32) {
        if self.triggers.remove(&code).is_some() {
            debug!("Cancelled reminder {code}");
        }
    }

    fn can_schedule_exact(&self) -> bool {
        self.exact
    }
}
