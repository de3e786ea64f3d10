use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{month::MonthKey, reminder::ReminderType},
    mongodb::Id,
};

/// A record that a reminder email was successfully sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderLogCore {
    pub user_id: String,
    pub user_email: String,
    pub area_id: String,
    pub month: MonthKey,
    pub reminder_type: ReminderType,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub sent_at: DateTime<Utc>,
}

/// A reminder log without an ID.
pub type NewReminderLog = ReminderLogCore;

/// A reminder log from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderLog {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub log: ReminderLogCore,
}

impl Deref for ReminderLog {
    type Target = ReminderLogCore;

    fn deref(&self) -> &Self::Target {
        &self.log
    }
}
