use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// Assignment IDs are allocated from an auto-increment counter.
pub type AssignmentId = u32;

/// Core assignment data: which user is responsible for which area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCore {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub area_id: String,
    pub area_name: String,
    /// Deactivated assignments are kept rather than deleted.
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// An assignment as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: AssignmentId,
    #[serde(flatten)]
    pub assignment: AssignmentCore,
}

impl Deref for Assignment {
    type Target = AssignmentCore;

    fn deref(&self) -> &Self::Target {
        &self.assignment
    }
}
