//! Monthly reminder emails: who gets one, and when they go out.

mod dispatcher;
mod schedule;

pub use dispatcher::{DispatchReport, ReminderDispatcher, MAX_CONCURRENT_SENDS};
pub use schedule::{next_reminder, ReminderSchedule, ReminderScheduleFairing, REMINDER_DAYS};
