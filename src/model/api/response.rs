use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::db::audit_response::{Answers, AuditResponse};

/// A submitted audit response, as shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponseDescription {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub area_id: String,
    pub area_name: String,
    pub responses: Answers,
    pub month: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<AuditResponse> for AuditResponseDescription {
    fn from(response: AuditResponse) -> Self {
        let AuditResponse { id, response } = response;
        Self {
            id: id.to_hex(),
            user_id: response.user_id,
            user_name: response.user_name,
            user_email: response.user_email,
            area_id: response.area_id,
            area_name: response.area_name,
            responses: response.responses,
            month: response.month.to_string(),
            submitted_at: response.submitted_at,
        }
    }
}

/// `GET /admin/responses` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseList {
    pub success: bool,
    pub responses: Vec<AuditResponseDescription>,
}
