pub mod alarms;
pub mod bible;
pub mod devotion;
pub mod notes;
