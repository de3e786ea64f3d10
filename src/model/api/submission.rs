use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::required,
    db::audit_response::{Answers, NewAuditResponse},
};

/// Recorded as the user ID of submissions that don't supply one.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// A questionnaire submission, as received from the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub area_id: Option<String>,
    pub area_name: Option<String>,
    pub responses: Option<Answers>,
    pub month: Option<String>,
}

impl SubmissionRequest {
    /// Check required fields and build the record to insert, stamped with the current time.
    pub fn validate(self) -> Result<NewAuditResponse> {
        let user_name = required(self.user_name, "userName")?;
        let area_id = required(self.area_id, "areaId")?;
        let area_name = required(self.area_name, "areaName")?;
        let responses = self
            .responses
            .ok_or_else(|| Error::BadRequest("Missing required field: responses".into()))?;
        let month = required(self.month, "month")?
            .parse()
            .map_err(|e| Error::BadRequest(format!("{e}")))?;

        Ok(NewAuditResponse {
            user_id: self
                .user_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| ANONYMOUS_USER_ID.to_string()),
            user_name,
            user_email: self.user_email.unwrap_or_default(),
            area_id,
            area_name,
            responses,
            month,
            submitted_at: Utc::now(),
        })
    }
}

/// Returned after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub id: String,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl SubmissionRequest {
        pub fn example(user_id: &str, area_id: &str, month: &str) -> Self {
            Self {
                user_id: Some(user_id.into()),
                user_name: Some(format!("User {user_id}")),
                user_email: Some(format!("{user_id}@x.edu")),
                area_id: Some(area_id.into()),
                area_name: Some(format!("Area {area_id}")),
                responses: Some(
                    [
                        ("1".to_string(), "Yes".to_string()),
                        ("2".to_string(), "Still working on an issue".to_string()),
                    ]
                    .into(),
                ),
                month: Some(month.into()),
            }
        }
    }
}
