//! What happens when a reminder fires: the alarm screen, the notification
//! and its snooze and dismiss actions.
use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, info};
use serde_derive::Serialize;

use crate::schedule::{AlarmBackend, LocalBackend, Scheduler};
use crate::DevotionalError;

/// Name used when a reminder arrives without one.
pub const DEFAULT_NAME: &str = "Prayer Time";

/// How long the alarm screen rings before stopping by itself.
pub const AUTO_STOP: StdDuration = StdDuration::from_secs(5 * 60);

/// Longest single sleep of the watcher, so wall clock changes are noticed.
const MAX_SLEEP: StdDuration = StdDuration::from_secs(60);

/// Data carried by a registered reminder and handed back when it fires.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReminderPayload {
    /// The saved alarm behind the reminder. A snooze keeps the id of the
    /// reminder it postpones.
    pub alarm_id: Option<i32>,
    pub name: String,
    pub time: NaiveTime,
}

impl ReminderPayload {
    pub fn new(alarm_id: Option<i32>, name: Option<&str>, time: NaiveTime) -> Self {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_NAME.to_string(),
        };
        ReminderPayload {
            alarm_id,
            name,
            time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NotificationAction {
    Snooze5,
    Snooze15,
    Snooze30,
    Dismiss,
}

impl NotificationAction {
    pub const ALL: [NotificationAction; 4] = [
        NotificationAction::Snooze5,
        NotificationAction::Snooze15,
        NotificationAction::Snooze30,
        NotificationAction::Dismiss,
    ];

    pub fn snooze_minutes(self) -> Option<i64> {
        match self {
            NotificationAction::Snooze5 => Some(5),
            NotificationAction::Snooze15 => Some(15),
            NotificationAction::Snooze30 => Some(30),
            NotificationAction::Dismiss => None,
        }
    }

    /// The action identifier, e.g. `SNOOZE_15`.
    pub fn code(self) -> &'static str {
        match self {
            NotificationAction::Snooze5 => "SNOOZE_5",
            NotificationAction::Snooze15 => "SNOOZE_15",
            NotificationAction::Snooze30 => "SNOOZE_30",
            NotificationAction::Dismiss => "DISMISS",
        }
    }
}

impl fmt::Display for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.snooze_minutes() {
            Some(minutes) => write!(f, "Snooze {minutes} min"),
            None => write!(f, "Dismiss"),
        }
    }
}

impl FromStr for NotificationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.code().eq_ignore_ascii_case(s))
            .or_else(|| match s {
                "5" => Some(NotificationAction::Snooze5),
                "15" => Some(NotificationAction::Snooze15),
                "30" => Some(NotificationAction::Snooze30),
                _ => None,
            })
            .ok_or_else(|| format!("'{s}' is not a reminder action"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub actions: Vec<NotificationAction>,
}

/// Request to bring up the full screen alarm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlarmScreen {
    pub name: String,
    pub time: NaiveTime,
    pub auto_stop: StdDuration,
}

/// Everything produced by one firing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reminder {
    pub payload: ReminderPayload,
    pub screen: AlarmScreen,
    pub notification: Notification,
}

impl Reminder {
    pub fn fire(payload: ReminderPayload) -> Self {
        info!("Reminder '{}' fired", payload.name);
        Reminder {
            screen: AlarmScreen {
                name: payload.name.clone(),
                time: payload.time,
                auto_stop: AUTO_STOP,
            },
            notification: Notification {
                title: DEFAULT_NAME.to_string(),
                text: format!("Time for {}", payload.name),
                actions: NotificationAction::ALL.to_vec(),
            },
            payload,
        }
    }
}

/// Receives fired reminders and answers with the reader's choice, if any.
pub trait ReminderSink {
    fn deliver(&mut self, reminder: &Reminder) -> Option<NotificationAction>;
}

/// Carries out a notification action. Snoozing registers a one-shot
/// reminder and returns when it will fire.
pub fn handle_action<B: AlarmBackend>(
    action: NotificationAction,
    payload: &ReminderPayload,
    scheduler: &mut Scheduler<B>,
    now: NaiveDateTime,
) -> Result<Option<NaiveDateTime>, DevotionalError> {
    match action.snooze_minutes() {
        Some(minutes) => scheduler.snooze(payload, minutes, now).map(Some),
        None => {
            info!("Reminder '{}' dismissed", payload.name);
            Ok(None)
        }
    }
}

/// Delivers reminders from `scheduler` as they come due until none are left
/// registered. Returns how many were delivered.
pub async fn watch<S, C>(
    scheduler: &mut Scheduler<LocalBackend>,
    sink: &mut S,
    clock: C,
) -> Result<usize, DevotionalError>
where
    S: ReminderSink + ?Sized,
    C: Fn() -> NaiveDateTime,
{
    let mut delivered = 0;
    loop {
        let now = clock();
        for trigger in scheduler.backend_mut().due(now) {
            let reminder = Reminder::fire(trigger.payload);
            delivered += 1;
            if let Some(action) = sink.deliver(&reminder) {
                handle_action(action, &reminder.payload, scheduler, now)?;
            }
        }

        let next = match scheduler.backend().next_at() {
            Some(next) => next,
            None => return Ok(delivered),
        };
        let wait = (next - now).to_std().unwrap_or(StdDuration::ZERO).min(MAX_SLEEP);
        debug!("Next reminder at {next}, sleeping {}s", wait.as_secs());
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn payload() -> ReminderPayload {
        ReminderPayload::new(Some(0), Some("Noon prayer"), noon().time())
    }

    struct Recorder {
        seen: Vec<String>,
        answers: Vec<Option<NotificationAction>>,
    }

    impl ReminderSink for Recorder {
        fn deliver(&mut self, reminder: &Reminder) -> Option<NotificationAction> {
            self.seen.push(reminder.payload.name.clone());
            if self.answers.is_empty() {
                None
            } else {
                self.answers.remove(0)
            }
        }
    }

    #[test]
    fn missing_name_gets_default() {
        let p = ReminderPayload::new(None, Some("  "), noon().time());
        assert_eq!(p.name, "Prayer Time");
        assert_eq!(ReminderPayload::new(None, None, noon().time()).name, "Prayer Time");
    }

    #[test]
    fn firing_builds_screen_and_notification() {
        let reminder = Reminder::fire(payload());
        assert_eq!(reminder.notification.text, "Time for Noon prayer");
        assert_eq!(reminder.notification.actions.len(), 4);
        assert_eq!(reminder.screen.auto_stop, StdDuration::from_secs(300));
    }

    #[test]
    fn action_codes() {
        assert_eq!("snooze_15".parse::<NotificationAction>(), Ok(NotificationAction::Snooze15));
        assert_eq!("30".parse::<NotificationAction>(), Ok(NotificationAction::Snooze30));
        assert_eq!("DISMISS".parse::<NotificationAction>(), Ok(NotificationAction::Dismiss));
        assert!("SNOOZE_10".parse::<NotificationAction>().is_err());
        assert_eq!(NotificationAction::Snooze5.to_string(), "Snooze 5 min");
    }

    #[test]
    fn snooze_registers_one_shot() {
        let mut scheduler = Scheduler::new(LocalBackend::new(true));
        let at = handle_action(NotificationAction::Snooze15, &payload(), &mut scheduler, noon())
            .unwrap();
        assert_eq!(at, Some(noon() + Duration::minutes(15)));

        let trigger = scheduler.backend().get(1015).unwrap();
        assert_eq!(trigger.repeat, None);
        assert_eq!(trigger.payload.name, "Noon prayer");
        assert_eq!(trigger.payload.alarm_id, Some(0));

        let dismissed =
            handle_action(NotificationAction::Dismiss, &payload(), &mut scheduler, noon()).unwrap();
        assert_eq!(dismissed, None);
    }

    #[tokio::test]
    async fn watch_delivers_due_reminders() {
        let mut scheduler = Scheduler::new(LocalBackend::new(true));
        // Due already when the watcher starts
        scheduler.snooze(&payload(), 5, noon() - Duration::minutes(10)).unwrap();

        let mut sink = Recorder {
            seen: vec![],
            answers: vec![Some(NotificationAction::Dismiss)],
        };
        let delivered = watch(&mut scheduler, &mut sink, noon).await.unwrap();

        assert_eq!(delivered, 1);
        assert_eq!(sink.seen, vec!["Noon prayer"]);
        assert!(scheduler.backend().next_at().is_none());
    }
}
