use log::info;
use rocket::{http::Status, serde::json::Json, Route};

use crate::{
    api::{json_body, JsonBody},
    error::{Error, Result},
    model::{
        api::submission::{SubmissionReceipt, SubmissionRequest},
        db::audit_response::NewAuditResponse,
        mongodb::{is_duplicate_key, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![submit_audit]
}

#[post("/submit-audit", data = "<body>", format = "json")]
pub async fn submit_audit(
    body: JsonBody<'_, SubmissionRequest>,
    new_responses: Coll<NewAuditResponse>,
) -> Result<(Status, Json<SubmissionReceipt>)> {
    let response = json_body(body)?.validate()?;

    let inserted = match new_responses.insert_one(&response, None).await {
        Ok(inserted) => inserted,
        Err(e) if is_duplicate_key(&e) => {
            return Err(Error::Conflict(
                "You have already submitted an audit for this area this month".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };
    let id: Id = inserted
        .inserted_id
        .as_object_id()
        .expect("Response IDs are generated by the database")
        .into();

    info!(
        "Audit for {} submitted by {} for {}",
        response.area_name, response.user_id, response.month
    );
    Ok((
        Status::Created,
        Json(SubmissionReceipt {
            success: true,
            id: id.to_hex(),
        }),
    ))
}
