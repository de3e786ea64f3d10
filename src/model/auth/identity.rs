use log::{debug, error, warn};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::Error};

use super::{
    AuthProvider, AuthToken, ClientPrincipal, Credentials, AUTH_TOKEN_COOKIE,
    CLIENT_PRINCIPAL_HEADER,
};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    /// How the user signed in.
    pub provider: String,
}

impl Identity {
    /// The identity granted to anyone who knows the shared admin password.
    pub fn shared_admin() -> Self {
        Self {
            user_id: "admin".into(),
            name: "Administrator".into(),
            provider: "password".into(),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Identity {
    type Error = Error;

    /// Accept either a valid auth token cookie or a principal header that the
    /// configured authenticator approves.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let rocket = req.rocket();
        let (Some(config), Some(authenticator)) =
            (rocket.state::<Config>(), rocket.state::<AuthProvider>())
        else {
            error!("Authentication state is not managed");
            return Outcome::Error((
                Status::InternalServerError,
                Error::Unauthorized("Authentication unavailable".into()),
            ));
        };

        if let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) {
            match AuthToken::from_cookie(cookie, config) {
                Ok(token) => return Outcome::Success(token.identity),
                Err(e) => debug!("Ignoring invalid auth token: {e}"),
            }
        }

        if let Some(header) = req.headers().get_one(CLIENT_PRINCIPAL_HEADER) {
            let result = ClientPrincipal::from_header(header).and_then(|principal| {
                authenticator.authenticate(&Credentials::Principal(principal))
            });
            return match result {
                Ok(identity) => Outcome::Success(identity),
                Err(e) => {
                    warn!("Rejected client principal: {e}");
                    Outcome::Error((Status::Unauthorized, e.into()))
                }
            };
        }

        Outcome::Error((
            Status::Unauthorized,
            Error::Unauthorized("Authentication required".into()),
        ))
    }
}
