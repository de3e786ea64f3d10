use rocket::{
    http::Status,
    serde::json::{json, Error as JsonError, Json, Value},
    Catcher, Request, Route,
};

use crate::error::{Error, Result, INTERNAL_ERROR_MESSAGE};

pub mod admin;
pub mod areas;
pub mod assignments;
pub mod audit;
pub mod auth;
pub mod reminders;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(areas::routes());
    routes.extend(assignments::routes());
    routes.extend(audit::routes());
    routes.extend(auth::routes());
    routes.extend(reminders::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// A JSON request body that may have failed to parse.
pub type JsonBody<'r, T> = std::result::Result<Json<T>, JsonError<'r>>;

/// Unwrap a JSON body, reporting parse failures as a bad request.
pub(crate) fn json_body<T>(body: JsonBody<'_, T>) -> Result<T> {
    match body {
        Ok(json) => Ok(json.into_inner()),
        Err(JsonError::Io(e)) => Err(Error::BadRequest(format!(
            "Could not read request body: {e}"
        ))),
        Err(JsonError::Parse(_, e)) => {
            Err(Error::BadRequest(format!("Invalid request body: {e}")))
        }
    }
}

/// Render every error Rocket produces itself in the same `{error}` shape as ours.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<Value>) {
    let message = match status.code {
        400 => "Bad request",
        401 => "Authentication required",
        404 => "Not found",
        422 => "Invalid request body",
        500..=599 => INTERNAL_ERROR_MESSAGE,
        _ => status.reason().unwrap_or("Unknown error"),
    };
    (status, Json(json!({ "error": message })))
}
