use log::{info, warn};
use rocket::{
    http::{CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    api::{json_body, JsonBody},
    config::Config,
    error::Result,
    model::{
        api::{
            credentials::{PasswordRequest, ValidateResponse},
            required,
        },
        auth::{AuthProvider, AuthToken, Credentials, Identity, AUTH_TOKEN_COOKIE},
    },
};

pub fn routes() -> Vec<Route> {
    routes![validate, me, logout]
}

#[post("/auth/validate", data = "<body>", format = "json")]
pub async fn validate(
    body: JsonBody<'_, PasswordRequest>,
    cookies: &CookieJar<'_>,
    authenticator: &State<AuthProvider>,
    config: &State<Config>,
) -> (Status, Json<ValidateResponse>) {
    match sign_in(body, authenticator) {
        Ok(identity) => {
            info!("{} signed in", identity.user_id);
            cookies.add(AuthToken::new(identity, config).into_cookie(config));
            (
                Status::Ok,
                Json(ValidateResponse {
                    success: true,
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!("Failed sign-in attempt: {e}");
            (
                e.status(),
                Json(ValidateResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

fn sign_in(body: JsonBody<'_, PasswordRequest>, authenticator: &AuthProvider) -> Result<Identity> {
    let password = required(json_body(body)?.password, "password")?;
    let identity = authenticator.authenticate(&Credentials::Password(password))?;
    Ok(identity)
}

#[get("/auth/me")]
pub fn me(identity: Identity) -> Json<Identity> {
    Json(identity)
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(AUTH_TOKEN_COOKIE);
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Header},
        local::asynchronous::Client,
        serde::json::json,
    };

    use crate::{
        model::auth::{ClientPrincipal, CLIENT_PRINCIPAL_HEADER},
        TEST_PASSWORD,
    };

    use super::*;

    async fn post_password(client: &Client, password: &str) -> (Status, ValidateResponse) {
        let response = client
            .post(uri!(validate))
            .header(ContentType::JSON)
            .body(json!({ "password": password }).to_string())
            .dispatch()
            .await;
        (response.status(), response.into_json().await.unwrap())
    }

    #[backend_test]
    async fn validate_correct_password(client: Client) {
        let (status, body) = post_password(&client, TEST_PASSWORD).await;

        assert_eq!(Status::Ok, status);
        assert!(body.success);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.get(uri!(me)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let identity: Identity = response.into_json().await.unwrap();
        assert_eq!(Identity::shared_admin(), identity);
    }

    #[backend_test]
    async fn validate_wrong_password(client: Client) {
        let (status, body) = post_password(&client, "not the password").await;

        assert_eq!(Status::Unauthorized, status);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Incorrect password"));
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn validate_missing_password(client: Client) {
        let response = client
            .post(uri!(validate))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        let body: ValidateResponse = response.into_json().await.unwrap();
        assert!(!body.success);
    }

    #[backend_test(admin)]
    async fn logout_clears_session(client: Client) {
        assert_eq!(Status::Ok, client.get(uri!(me)).dispatch().await.status());

        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        assert_eq!(Status::Unauthorized, client.get(uri!(me)).dispatch().await.status());
    }

    #[backend_test]
    async fn principal_unsupported_with_password_strategy(client: Client) {
        let header = ClientPrincipal::example(&["authenticated"]).to_header();
        let response = client
            .get(uri!(me))
            .header(Header::new(CLIENT_PRINCIPAL_HEADER, header))
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
    }
}
