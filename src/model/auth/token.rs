use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite},
    time::Duration,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;

use super::Identity;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// A signed session token: the identity plus an expiry datetime.
#[derive(Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

impl AuthToken {
    /// Create a token for the given identity, expiring after the configured TTL.
    pub fn new(identity: Identity, config: &Config) -> Self {
        Self {
            identity,
            expire_at: Utc::now() + config.auth_ttl(),
        }
    }

    /// Sign this token and wrap it in a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let token = jsonwebtoken::encode(
            &Header::default(),
            &self,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build((AUTH_TOKEN_COOKIE, token))
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .build()
    }

    /// Verify and decode a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data: TokenData<Self>| data.claims)?;
        Ok(token)
    }
}
