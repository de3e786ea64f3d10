use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::Result,
    model::{
        api::response::{AuditResponseDescription, ResponseList},
        auth::Identity,
        db::audit_response::AuditResponse,
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![list_responses]
}

#[get("/admin/responses")]
pub async fn list_responses(
    _identity: Identity,
    responses: Coll<AuditResponse>,
) -> Result<Json<ResponseList>> {
    let newest_first = FindOptions::builder()
        .sort(doc! { "submitted_at": -1 })
        .build();
    let responses: Vec<_> = responses
        .find(None, newest_first)
        .await?
        .map_ok(AuditResponseDescription::from)
        .try_collect()
        .await?;
    Ok(Json(ResponseList {
        success: true,
        responses,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::model::db::audit_response::NewAuditResponse;

    use super::*;

    #[backend_test(admin)]
    async fn newest_first(client: Client, new_responses: Coll<NewAuditResponse>) {
        let mut older = NewAuditResponse::example("u1", "a1", "2025-01");
        older.submitted_at = older.submitted_at - Duration::days(1);
        let newer = NewAuditResponse::example("u2", "a1", "2025-01");
        new_responses.insert_one(&older, None).await.unwrap();
        new_responses.insert_one(&newer, None).await.unwrap();

        let response = client.get(uri!(list_responses)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let list: ResponseList = response.into_json().await.unwrap();
        assert!(list.success);
        let users: Vec<_> = list.responses.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["u2", "u1"]);
        assert_eq!(list.responses[1].month, "2025-01");
        assert_eq!(list.responses[1].responses, older.responses);
        assert_eq!(list.responses[1].submitted_at, older.submitted_at);
    }

    #[backend_test]
    async fn requires_authentication(client: Client) {
        let response = client.get(uri!(list_responses)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }
}
