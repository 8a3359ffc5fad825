use std::error::Error;

use chrono::{Local, NaiveDateTime};
use log::info;

use devotional::alarms::parse_time;
use devotional::reminder::{self, Reminder, ReminderSink};
use devotional::schedule::next_occurrence;
use devotional::{AlarmStore, DayMask, LocalBackend, NotificationAction, SavedAlarm, Scheduler};

use crate::config::Config;

fn print_alarm(alarm: &SavedAlarm) {
    let state = if alarm.active { "on" } else { "off" };
    println!(
        "#{} {} {} [{}] {}",
        alarm.id,
        alarm.time_text(),
        alarm.name,
        alarm.days.days_text(),
        state
    );
}

/// When `alarm` fires next. Nothing is registered here; `alarm watch`
/// registers every saved alarm when it starts.
fn next_firing_text(alarm: &SavedAlarm, now: NaiveDateTime) -> String {
    match next_occurrence(alarm, now) {
        Some(next) => format!("Next reminder {}", next.format("%a %d %b %H:%M")),
        None => "Alarm is off".to_string(),
    }
}

fn report_schedule(alarm: &SavedAlarm) -> Result<(), Box<dyn Error>> {
    println!("{}", next_firing_text(alarm, Local::now().naive_local()));
    Ok(())
}

pub fn add(config: &Config, name: &str, time: &str, days: &str) -> Result<(), Box<dyn Error>> {
    let mut store = AlarmStore::open(&config.data);
    let alarm = store.add(name, parse_time(time)?, days.parse()?)?;
    print_alarm(&alarm);
    report_schedule(&alarm)
}

pub fn list(config: &Config) -> Result<(), Box<dyn Error>> {
    let alarms = AlarmStore::open(&config.data).list();
    if alarms.is_empty() {
        println!("No alarms saved");
    }
    for alarm in &alarms {
        print_alarm(alarm);
    }
    Ok(())
}

pub fn edit(
    config: &Config,
    id: i32,
    name: Option<&str>,
    time: Option<&str>,
    days: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut store = AlarmStore::open(&config.data);
    let current = store.get(id)?;
    let time = match time {
        Some(time) => parse_time(time)?,
        None => current.time,
    };
    let days: DayMask = match days {
        Some(days) => days.parse()?,
        None => current.days,
    };

    let alarm = store.update(id, name.unwrap_or(&current.name), time, days)?;
    print_alarm(&alarm);
    report_schedule(&alarm)
}

pub fn toggle(config: &Config, id: i32) -> Result<(), Box<dyn Error>> {
    let mut store = AlarmStore::open(&config.data);
    let active = !store.get(id)?.active;
    let alarm = store.set_active(id, active)?;
    print_alarm(&alarm);
    report_schedule(&alarm)
}

pub fn delete(config: &Config, id: i32) -> Result<(), Box<dyn Error>> {
    let deleted = AlarmStore::open(&config.data).delete(id)?;
    println!("Deleted alarm '{}'", deleted.name);
    Ok(())
}

/// Lists the next firing of every active alarm, soonest first.
pub fn next(config: &Config) -> Result<(), Box<dyn Error>> {
    let now = Local::now().naive_local();
    let mut upcoming: Vec<_> = AlarmStore::open(&config.data)
        .list()
        .into_iter()
        .filter_map(|alarm| next_occurrence(&alarm, now).map(|at| (at, alarm)))
        .collect();
    upcoming.sort_by_key(|(at, _)| *at);

    if upcoming.is_empty() {
        println!("No active alarms");
    }
    for (at, alarm) in upcoming {
        println!("{} {}", at.format("%a %d %b %H:%M"), alarm.name);
    }
    Ok(())
}

/// Prints each reminder and answers with a fixed action.
struct ConsoleSink {
    answer: Option<NotificationAction>,
}

impl ReminderSink for ConsoleSink {
    fn deliver(&mut self, reminder: &Reminder) -> Option<NotificationAction> {
        let actions: Vec<String> = reminder
            .notification
            .actions
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "[{}] {}: {} ({})",
            reminder.screen.time.format("%H:%M"),
            reminder.notification.title,
            reminder.notification.text,
            actions.join(" | ")
        );
        self.answer
    }
}

/// Fires reminders for every active alarm until interrupted.
pub async fn watch(
    config: &Config,
    exact: bool,
    answer: Option<NotificationAction>,
) -> Result<(), Box<dyn Error>> {
    let now = Local::now().naive_local();
    let mut scheduler = Scheduler::new(LocalBackend::new(exact));
    for alarm in AlarmStore::open(&config.data).list() {
        scheduler.schedule(&alarm, now)?;
    }

    let mut sink = ConsoleSink { answer };
    let clock = || Local::now().naive_local();
    tokio::select! {
        delivered = reminder::watch(&mut scheduler, &mut sink, clock) => {
            info!("Delivered {} reminder(s), nothing left to watch", delivered?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Stopped watching");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn next_firing_of_saved_alarm() {
        // A Wednesday
        let now = NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let mut alarm = SavedAlarm {
            id: 0,
            name: "Morning prayer".to_string(),
            time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            days: DayMask::WEEKDAYS,
            active: true,
        };
        assert_eq!(next_firing_text(&alarm, now), "Next reminder Thu 07 Mar 06:30");

        alarm.active = false;
        assert_eq!(next_firing_text(&alarm, now), "Alarm is off");
    }
}
