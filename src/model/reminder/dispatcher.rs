use chrono::Utc;
use log::{debug, error, info, warn};
use mongodb::{bson::doc, Database};
use rocket::futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    common::{month::MonthKey, reminder::ReminderType},
    db::{
        assignment::Assignment,
        audit_response::AuditResponse,
        reminder_log::{NewReminderLog, ReminderLog},
    },
    email::{reminder_email, Mailer, ReminderContext},
    mongodb::{is_duplicate_key, Coll},
};

/// Upper bound on send attempts in flight at once.
pub const MAX_CONCURRENT_SENDS: usize = 8;

/// Summary of one round of reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub success: bool,
    pub message: String,
    pub reminder_type: ReminderType,
    pub month: MonthKey,
    pub sent: usize,
    pub failed: usize,
    pub emails_sent: Vec<String>,
    pub emails_failed: Vec<String>,
}

/// What happened to a single assignment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Outcome {
    AlreadyReminded,
    AlreadySubmitted,
    Sent,
    Failed,
}

/// Sends reminders to every active assignment that has neither submitted nor
/// already received this reminder for the month.
pub struct ReminderDispatcher {
    assignments: Coll<Assignment>,
    responses: Coll<AuditResponse>,
    reminder_logs: Coll<ReminderLog>,
    new_reminder_logs: Coll<NewReminderLog>,
    mailer: Mailer,
    app_url: String,
}

impl ReminderDispatcher {
    pub fn new(db: &Database, mailer: Mailer, app_url: impl Into<String>) -> Self {
        Self {
            assignments: Coll::from_db(db),
            responses: Coll::from_db(db),
            reminder_logs: Coll::from_db(db),
            new_reminder_logs: Coll::from_db(db),
            mailer,
            app_url: app_url.into(),
        }
    }

    /// Run one round of reminders.
    ///
    /// Only fails if the active assignments cannot be listed; failures for
    /// individual users are reported in the result.
    pub async fn dispatch(
        &self,
        reminder_type: ReminderType,
        month: &MonthKey,
    ) -> Result<DispatchReport> {
        let active: Vec<Assignment> = self
            .assignments
            .find(doc! { "is_active": true }, None)
            .await?
            .try_collect()
            .await?;
        debug!(
            "Dispatching {reminder_type} reminders for {month} across {} active assignments",
            active.len()
        );

        let outcomes: Vec<(String, Outcome)> = stream::iter(active)
            .map(|assignment| async move {
                let outcome = self.remind(&assignment, reminder_type, month).await;
                (assignment.assignment.user_email, outcome)
            })
            .buffer_unordered(MAX_CONCURRENT_SENDS)
            .collect()
            .await;

        let mut emails_sent = Vec::new();
        let mut emails_failed = Vec::new();
        for (email, outcome) in outcomes {
            match outcome {
                Outcome::Sent => emails_sent.push(email),
                Outcome::Failed => emails_failed.push(email),
                Outcome::AlreadyReminded | Outcome::AlreadySubmitted => {}
            }
        }

        let report = DispatchReport {
            success: true,
            message: format!(
                "Sent {} {reminder_type} reminders for {month}",
                emails_sent.len()
            ),
            reminder_type,
            month: month.clone(),
            sent: emails_sent.len(),
            failed: emails_failed.len(),
            emails_sent,
            emails_failed,
        };
        if report.failed > 0 {
            warn!("{}, {} failed", report.message, report.failed);
        } else {
            info!("{}", report.message);
        }
        Ok(report)
    }

    /// Handle one assignment, converting any error into a failure.
    async fn remind(
        &self,
        assignment: &Assignment,
        reminder_type: ReminderType,
        month: &MonthKey,
    ) -> Outcome {
        match self.try_remind(assignment, reminder_type, month).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Failed to send {reminder_type} reminder to {} for {}: {e}",
                    assignment.user_email, assignment.area_name
                );
                Outcome::Failed
            }
        }
    }

    async fn try_remind(
        &self,
        assignment: &Assignment,
        reminder_type: ReminderType,
        month: &MonthKey,
    ) -> Result<Outcome> {
        let already_reminded = doc! {
            "user_id": &assignment.user_id,
            "area_id": &assignment.area_id,
            "month": month,
            "reminder_type": reminder_type,
        };
        if self
            .reminder_logs
            .count_documents(already_reminded, None)
            .await?
            > 0
        {
            debug!(
                "{reminder_type} reminder already sent to {} for {}",
                assignment.user_email, assignment.area_name
            );
            return Ok(Outcome::AlreadyReminded);
        }

        let already_submitted = doc! {
            "user_id": &assignment.user_id,
            "area_id": &assignment.area_id,
            "month": month,
        };
        if self
            .responses
            .count_documents(already_submitted, None)
            .await?
            > 0
        {
            debug!(
                "Audit already submitted by {} for {}",
                assignment.user_email, assignment.area_name
            );
            return Ok(Outcome::AlreadySubmitted);
        }

        let context = ReminderContext {
            user_name: &assignment.user_name,
            area_name: &assignment.area_name,
            month,
            app_url: &self.app_url,
        };
        let email = reminder_email(reminder_type, &assignment.user_email, &context);
        self.mailer.send(&email).await?;

        let log = NewReminderLog {
            user_id: assignment.user_id.clone(),
            user_email: assignment.user_email.clone(),
            area_id: assignment.area_id.clone(),
            month: month.clone(),
            reminder_type,
            sent_at: Utc::now(),
        };
        match self.new_reminder_logs.insert_one(&log, None).await {
            Ok(_) => {}
            // A concurrent round got there first; the send still happened.
            Err(e) if is_duplicate_key(&e) => {
                warn!(
                    "{reminder_type} reminder to {} for {} was logged concurrently",
                    assignment.user_email, assignment.area_name
                );
            }
            Err(e) => {
                error!(
                    "{reminder_type} reminder to {} for {} was sent but not logged",
                    assignment.user_email, assignment.area_name
                );
                return Err(e.into());
            }
        }

        info!(
            "Sent {reminder_type} reminder to {} for {}",
            assignment.user_email, assignment.area_name
        );
        Ok(Outcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::model::{db::audit_response::NewAuditResponse, email::RecordingTransport};

    use super::*;

    const APP_URL: &str = "https://audit.example.edu/";

    fn dispatcher(db: &Database) -> (ReminderDispatcher, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        (ReminderDispatcher::new(db, transport.clone(), APP_URL), transport)
    }

    async fn assign(assignments: &Coll<Assignment>, id: u32, user_id: &str, email: &str) {
        let mut assignment = Assignment::example(id, user_id, "a1");
        assignment.assignment.user_email = email.to_string();
        assignments.insert_one(assignment, None).await.unwrap();
    }

    #[backend_test]
    async fn submitted_users_not_reminded(
        db: Database,
        assignments: Coll<Assignment>,
        responses: Coll<NewAuditResponse>,
    ) {
        assign(&assignments, 1, "u1", "u1@x.edu").await;
        responses
            .insert_one(NewAuditResponse::example("u1", "a1", "2025-01"), None)
            .await
            .unwrap();

        let (dispatcher, transport) = dispatcher(&db);
        let month = "2025-01".parse().unwrap();
        let report = dispatcher.dispatch(ReminderType::First, &month).await.unwrap();

        assert!(report.success);
        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 0);
        assert!(transport.sent().is_empty());
    }

    #[backend_test]
    async fn pending_user_reminded_once(
        db: Database,
        assignments: Coll<Assignment>,
        reminder_logs: Coll<ReminderLog>,
    ) {
        assign(&assignments, 1, "u1", "u1@x.edu").await;

        let (dispatcher, transport) = dispatcher(&db);
        let month: MonthKey = "2025-02".parse().unwrap();
        let report = dispatcher.dispatch(ReminderType::First, &month).await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.emails_sent, vec!["u1@x.edu".to_string()]);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "u1@x.edu");
        assert_eq!(sent[0].subject, "Monthly Audit Now Open - Area a1 (2025-02)");

        let logs: Vec<ReminderLog> = reminder_logs
            .find(None, None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, "u1");
        assert_eq!(logs[0].area_id, "a1");
        assert_eq!(logs[0].month, month);
        assert_eq!(logs[0].reminder_type, ReminderType::First);
    }

    #[backend_test]
    async fn repeated_rounds_are_idempotent(db: Database, assignments: Coll<Assignment>) {
        assign(&assignments, 1, "u1", "u1@x.edu").await;
        assign(&assignments, 2, "u2", "u2@x.edu").await;

        let (dispatcher, transport) = dispatcher(&db);
        let month = "2025-02".parse().unwrap();
        let first = dispatcher.dispatch(ReminderType::MidMonth, &month).await.unwrap();
        let second = dispatcher.dispatch(ReminderType::MidMonth, &month).await.unwrap();

        assert_eq!(first.sent, 2);
        assert_eq!(second.sent, 0);
        assert_eq!(transport.sent().len(), 2);

        // A different stage is a different reminder.
        let last = dispatcher.dispatch(ReminderType::Final, &month).await.unwrap();
        assert_eq!(last.sent, 2);
        assert_eq!(transport.sent().len(), 4);
    }

    #[backend_test]
    async fn inactive_assignments_skipped(db: Database, assignments: Coll<Assignment>) {
        let mut inactive = Assignment::example(1, "u1", "a1");
        inactive.assignment.is_active = false;
        assignments.insert_one(inactive, None).await.unwrap();

        let (dispatcher, transport) = dispatcher(&db);
        let report = dispatcher
            .dispatch(ReminderType::First, &"2025-02".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(report.sent, 0);
        assert!(transport.sent().is_empty());
    }

    #[backend_test]
    async fn failures_isolated(
        db: Database,
        assignments: Coll<Assignment>,
        reminder_logs: Coll<ReminderLog>,
    ) {
        assign(&assignments, 1, "u1", "u1@x.edu").await;
        assign(&assignments, 2, "u2", "fail@x.edu").await;
        assign(&assignments, 3, "u3", "u3@x.edu").await;

        let (dispatcher, transport) = dispatcher(&db);
        let month = "2025-02".parse().unwrap();
        let report = dispatcher.dispatch(ReminderType::Final, &month).await.unwrap();

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.emails_failed, vec!["fail@x.edu".to_string()]);
        assert_eq!(
            reminder_logs.count_documents(None, None).await.unwrap(),
            2
        );

        // Re-running retries only the failure.
        let retry = dispatcher.dispatch(ReminderType::Final, &month).await.unwrap();
        assert_eq!(retry.sent, 0);
        assert_eq!(retry.failed, 1);
        assert_eq!(transport.sent().len(), 2);
    }
}
