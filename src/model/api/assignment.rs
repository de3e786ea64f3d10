use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::required,
    db::assignment::{Assignment, AssignmentCore, AssignmentId},
};

/// A request to make a user responsible for an area.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub area_id: Option<String>,
    pub area_name: Option<String>,
}

impl AssignmentRequest {
    /// Check that every field is present and build an active assignment.
    pub fn validate(self) -> Result<AssignmentCore> {
        Ok(AssignmentCore {
            user_id: required(self.user_id, "userId")?,
            user_name: required(self.user_name, "userName")?,
            user_email: required(self.user_email, "userEmail")?,
            area_id: required(self.area_id, "areaId")?,
            area_name: required(self.area_name, "areaName")?,
            is_active: true,
            created_at: Utc::now(),
        })
    }
}

/// An assignment as shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDescription {
    pub id: AssignmentId,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub area_id: String,
    pub area_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Assignment> for AssignmentDescription {
    fn from(assignment: Assignment) -> Self {
        let Assignment { id, assignment } = assignment;
        Self {
            id,
            user_id: assignment.user_id,
            user_name: assignment.user_name,
            user_email: assignment.user_email,
            area_id: assignment.area_id,
            area_name: assignment.area_name,
            is_active: assignment.is_active,
            created_at: assignment.created_at,
        }
    }
}

/// `GET /assignments` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentList {
    pub assignments: Vec<AssignmentDescription>,
}

/// Body returned after creating or deactivating an assignment.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentChanged {
    pub success: bool,
    pub assignment: AssignmentDescription,
}
