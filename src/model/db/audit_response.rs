use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::month::MonthKey, mongodb::Id};

/// Answers keyed by question ID.
pub type Answers = BTreeMap<String, String>;

/// Core audit response data. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResponseCore {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub area_id: String,
    pub area_name: String,
    pub responses: Answers,
    pub month: MonthKey,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
}

/// An audit response without an ID.
pub type NewAuditResponse = AuditResponseCore;

/// An audit response from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub response: AuditResponseCore,
}

impl Deref for AuditResponse {
    type Target = AuditResponseCore;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}
