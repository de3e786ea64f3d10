use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    http::Status,
    outcome::IntoOutcome,
    request::{self, FromRequest, Request},
};

use crate::model::db::{
    assignment::Assignment,
    audit_response::{AuditResponse, NewAuditResponse},
    reminder_log::{NewReminderLog, ReminderLog},
};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database from managed state and wrap it in a collection.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        req.rocket()
            .state::<Database>()
            .map(Coll::from_db)
            .or_error((Status::InternalServerError, ()))
    }
}

// Audit response collections
const AUDIT_RESPONSES: &str = "audit_responses";
impl MongoCollection for AuditResponse {
    const NAME: &'static str = AUDIT_RESPONSES;
}
impl MongoCollection for NewAuditResponse {
    const NAME: &'static str = AUDIT_RESPONSES;
}

// Assignment collection. IDs are allocated up front, so there is no separate "new" type.
const ASSIGNMENTS: &str = "user_area_assignments";
impl MongoCollection for Assignment {
    const NAME: &'static str = ASSIGNMENTS;
}

// Reminder log collections
const EMAIL_REMINDERS: &str = "email_reminders";
impl MongoCollection for ReminderLog {
    const NAME: &'static str = EMAIL_REMINDERS;
}
impl MongoCollection for NewReminderLog {
    const NAME: &'static str = EMAIL_REMINDERS;
}

// Counter collection
const COUNTERS: &str = "counters";
impl MongoCollection for Counter {
    const NAME: &'static str = COUNTERS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Audit responses: one submission per user, area and month.
    let response_index = IndexModel::builder()
        .keys(doc! {"user_id": 1, "area_id": 1, "month": 1})
        .options(unique.clone())
        .build();
    let response_time_index = IndexModel::builder()
        .keys(doc! {"submitted_at": -1})
        .build();
    Coll::<AuditResponse>::from_db(db)
        .create_indexes([response_index, response_time_index], None)
        .await?;

    // Assignments: one per user and area, active or not.
    let assignment_index = IndexModel::builder()
        .keys(doc! {"user_id": 1, "area_id": 1})
        .options(unique.clone())
        .build();
    let active_index = IndexModel::builder().keys(doc! {"is_active": 1}).build();
    Coll::<Assignment>::from_db(db)
        .create_indexes([assignment_index, active_index], None)
        .await?;

    // Reminder log: one send per user, area, month and reminder type.
    let reminder_index = IndexModel::builder()
        .keys(doc! {"user_id": 1, "area_id": 1, "month": 1, "reminder_type": 1})
        .options(unique)
        .build();
    Coll::<ReminderLog>::from_db(db)
        .create_index(reminder_index, None)
        .await?;

    Ok(())
}
