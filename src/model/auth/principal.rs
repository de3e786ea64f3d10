use data_encoding::BASE64;
use rocket::serde::json;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Header carrying the principal asserted by the upstream identity provider.
pub const CLIENT_PRINCIPAL_HEADER: &str = "x-ms-client-principal";

/// A signed-in user as described by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPrincipal {
    pub identity_provider: String,
    pub user_id: String,
    pub user_details: String,
    #[serde(default)]
    pub user_roles: Vec<String>,
}

impl ClientPrincipal {
    /// Decode the base64-encoded JSON header value.
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let bytes = BASE64
            .decode(value.trim().as_bytes())
            .map_err(|_| AuthError::MalformedPrincipal)?;
        json::from_slice(&bytes).map_err(|_| AuthError::MalformedPrincipal)
    }

    /// Encode as a header value.
    pub fn to_header(&self) -> String {
        // Serialising a struct of strings cannot fail.
        let body = json::to_string(self).unwrap_or_default();
        BASE64.encode(body.as_bytes())
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl ClientPrincipal {
        pub fn example(roles: &[&str]) -> Self {
            Self {
                identity_provider: "aad".into(),
                user_id: "u1".into(),
                user_details: "u1@x.edu".into(),
                user_roles: roles.iter().map(|r| r.to_string()).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let principal = ClientPrincipal::example(&["authenticated"]);
        let decoded = ClientPrincipal::from_header(&principal.to_header()).unwrap();
        assert_eq!(principal, decoded);
    }

    #[test]
    fn malformed_header() {
        assert_eq!(
            ClientPrincipal::from_header("not base64!"),
            Err(AuthError::MalformedPrincipal)
        );
        let not_json = BASE64.encode(b"{\"userId\": 5");
        assert_eq!(
            ClientPrincipal::from_header(&not_json),
            Err(AuthError::MalformedPrincipal)
        );
    }
}
