use log::info;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    api::{json_body, JsonBody},
    error::{Error, Result},
    model::{
        api::assignment::{
            AssignmentChanged, AssignmentDescription, AssignmentList, AssignmentRequest,
        },
        auth::Identity,
        db::assignment::{Assignment, AssignmentId},
        mongodb::{is_duplicate_key, u32_id_filter, Coll, Counter, ASSIGNMENT_ID_COUNTER_ID},
    },
};

pub fn routes() -> Vec<Route> {
    routes![list_assignments, create_assignment, deactivate_assignment]
}

#[get("/assignments")]
pub async fn list_assignments(
    _identity: Identity,
    assignments: Coll<Assignment>,
) -> Result<Json<AssignmentList>> {
    let newest_first = FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .build();
    let assignments: Vec<_> = assignments
        .find(None, newest_first)
        .await?
        .map_ok(AssignmentDescription::from)
        .try_collect()
        .await?;
    Ok(Json(AssignmentList { assignments }))
}

#[post("/assignments", data = "<body>", format = "json")]
pub async fn create_assignment(
    identity: Identity,
    body: JsonBody<'_, AssignmentRequest>,
    assignments: Coll<Assignment>,
    counters: Coll<Counter>,
) -> Result<Json<AssignmentChanged>> {
    let assignment = json_body(body)?.validate()?;

    let existing = doc! {
        "user_id": &assignment.user_id,
        "area_id": &assignment.area_id,
    };
    if assignments.count_documents(existing, None).await? > 0 {
        return Err(already_assigned());
    }

    let id = Counter::next(&counters, ASSIGNMENT_ID_COUNTER_ID).await?;
    let assignment = Assignment { id, assignment };
    match assignments.insert_one(&assignment, None).await {
        Ok(_) => {}
        // Lost a race with a concurrent request for the same pair.
        Err(e) if is_duplicate_key(&e) => return Err(already_assigned()),
        Err(e) => return Err(e.into()),
    }

    info!(
        "{} assigned {} to {} (assignment {id})",
        identity.user_id, assignment.user_email, assignment.area_name
    );
    Ok(Json(AssignmentChanged {
        success: true,
        assignment: assignment.into(),
    }))
}

fn already_assigned() -> Error {
    Error::Conflict("User is already assigned to this area".to_string())
}

/// Soft delete: the assignment is kept but no longer receives reminders.
#[delete("/assignments?<id>")]
pub async fn deactivate_assignment(
    identity: Identity,
    id: Option<&str>,
    assignments: Coll<Assignment>,
) -> Result<Json<AssignmentChanged>> {
    let id = id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::BadRequest("Missing required parameter: id".to_string()))?;
    let id: AssignmentId = id
        .parse()
        .map_err(|_| Error::BadRequest(format!("Invalid assignment id {id:?}")))?;

    let deactivate = doc! { "$set": { "is_active": false } };
    let return_updated = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let assignment = assignments
        .find_one_and_update(u32_id_filter(id), deactivate, return_updated)
        .await?
        .ok_or_else(|| Error::not_found(format!("Assignment {id}")))?;

    info!(
        "{} deactivated assignment {id} ({} for {})",
        identity.user_id, assignment.user_email, assignment.area_name
    );
    Ok(Json(AssignmentChanged {
        success: true,
        assignment: assignment.into(),
    }))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use super::*;

    async fn create(client: &Client, request: &AssignmentRequest) -> (Status, Value) {
        let response = client
            .post(uri!(create_assignment))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await;
        (response.status(), response.into_json().await.unwrap())
    }

    #[backend_test(admin)]
    async fn create_and_list(client: Client, assignments: Coll<Assignment>) {
        let (status, body) = create(&client, &AssignmentRequest::example("u1", "a1")).await;
        assert_eq!(Status::Ok, status);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["assignment"]["id"], json!(1));
        assert_eq!(body["assignment"]["isActive"], json!(true));

        let (status, body) = create(&client, &AssignmentRequest::example("u2", "a1")).await;
        assert_eq!(Status::Ok, status);
        assert_eq!(body["assignment"]["id"], json!(2));

        let stored = assignments
            .find_one(u32_id_filter(1), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_email, "u1@x.edu");

        let response = client.get(uri!(list_assignments)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let list: AssignmentList = response.into_json().await.unwrap();
        let ids: Vec<_> = list.assignments.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[backend_test(admin)]
    async fn create_duplicate(client: Client, assignments: Coll<Assignment>) {
        let (status, _) = create(&client, &AssignmentRequest::example("u1", "a1")).await;
        assert_eq!(Status::Ok, status);

        let conflicting = AssignmentRequest {
            user_name: Some("Someone Else".into()),
            user_email: Some("else@x.edu".into()),
            ..AssignmentRequest::example("u1", "a1")
        };
        let (status, body) = create(&client, &conflicting).await;
        assert_eq!(Status::Conflict, status);
        assert_eq!(body["error"], json!("User is already assigned to this area"));
        assert_eq!(assignments.count_documents(None, None).await.unwrap(), 1);

        // The first assignment is left as it was.
        let stored = assignments
            .find_one(u32_id_filter(1), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_name, "User u1");
        assert_eq!(stored.user_email, "u1@x.edu");
        assert!(stored.is_active);
    }

    #[backend_test(admin)]
    async fn create_missing_field(client: Client) {
        let request = AssignmentRequest {
            area_name: None,
            ..AssignmentRequest::example("u1", "a1")
        };
        let (status, body) = create(&client, &request).await;
        assert_eq!(Status::BadRequest, status);
        assert_eq!(body["error"], json!("Missing required field: areaName"));
    }

    #[backend_test(admin)]
    async fn deactivate(client: Client, assignments: Coll<Assignment>) {
        assignments
            .insert_one(Assignment::example(7, "u1", "a1"), None)
            .await
            .unwrap();

        let response = client.delete("/assignments?id=7").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let body: AssignmentChanged = response.into_json().await.unwrap();
        assert!(body.success);
        assert!(!body.assignment.is_active);

        // The row is kept.
        let stored = assignments
            .find_one(u32_id_filter(7), None)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_active);
        assert_eq!(
            AssignmentDescription::from(stored).user_id,
            body.assignment.user_id
        );

        // Deactivating again still succeeds.
        let response = client.delete("/assignments?id=7").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let body: AssignmentChanged = response.into_json().await.unwrap();
        assert!(body.success);
        assert_eq!(body.assignment.id, 7);
        assert!(!body.assignment.is_active);
        assert_eq!(assignments.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test(admin)]
    async fn deactivate_invalid(client: Client) {
        let response = client.delete("/assignments").dispatch().await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client.delete("/assignments?id=seven").dispatch().await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client.delete("/assignments?id=99").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body, json!({ "error": "Assignment 99 not found" }));
    }

    #[backend_test]
    async fn requires_authentication(client: Client, assignments: Coll<Assignment>) {
        assert_eq!(
            Status::Unauthorized,
            client.get(uri!(list_assignments)).dispatch().await.status()
        );

        let (status, _) = create(&client, &AssignmentRequest::example("u1", "a1")).await;
        assert_eq!(Status::Unauthorized, status);
        assert_eq!(assignments.count_documents(None, None).await.unwrap(), 0);

        let response = client.delete("/assignments?id=1").dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }
}
