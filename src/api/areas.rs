use rocket::{serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::common::area::{Area, AREAS},
};

pub fn routes() -> Vec<Route> {
    routes![get_areas, get_area]
}

#[get("/areas")]
pub fn get_areas() -> Json<&'static [Area]> {
    Json(AREAS)
}

#[get("/areas/<area_id>")]
pub fn get_area(area_id: &str) -> Result<Json<&'static Area>> {
    Area::find(area_id)
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Area {area_id}")))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::Status,
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use super::*;

    #[backend_test]
    async fn list_areas(client: Client) {
        let response = client.get(uri!(get_areas)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let areas: Vec<Value> = response.into_json().await.unwrap();
        assert_eq!(areas.len(), AREAS.len());
        assert_eq!(areas[0]["id"], json!(AREAS[0].id));
    }

    #[backend_test]
    async fn single_area(client: Client) {
        let response = client.get(uri!(get_area("data-analytics"))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let area: Value = response.into_json().await.unwrap();
        assert_eq!(area["name"], json!(Area::find("data-analytics").unwrap().name));

        let response = client.get(uri!(get_area("nowhere"))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body, json!({ "error": "Area nowhere not found" }));
    }
}
