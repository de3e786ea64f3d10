use log::error;
use serde::Deserialize;
use thiserror::Error;

use super::{ClientPrincipal, Identity};

/// The authenticator in managed state.
pub type AuthProvider = Box<dyn Authenticator>;

/// Something a caller presents to prove who they are.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// The shared admin password.
    Password(String),
    /// An identity asserted by the upstream identity provider.
    Principal(ClientPrincipal),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect password")]
    InvalidCredentials,
    #[error("This sign-in method is not enabled")]
    UnsupportedCredentials,
    #[error("Malformed client principal")]
    MalformedPrincipal,
    #[error("Signed-in user does not have a permitted role")]
    Forbidden,
}

/// Which authentication strategy is in use. Chosen by deployment config.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// A single shared password, stored as an argon2 hash.
    Password,
    /// Sign-in handled by an upstream identity provider.
    Delegated,
}

/// Verifies credentials, producing the identity they belong to.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

/// Accepts the shared admin password, checked against an argon2 hash.
pub struct SharedPasswordAuthenticator {
    password_hash: String,
}

impl SharedPasswordAuthenticator {
    /// Fails if `password_hash` is not a well-formed argon2 encoded hash.
    pub fn new(password_hash: String) -> Result<Self, argon2::Error> {
        argon2::verify_encoded(&password_hash, b"")?;
        Ok(Self { password_hash })
    }
}

impl Authenticator for SharedPasswordAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let Credentials::Password(password) = credentials else {
            return Err(AuthError::UnsupportedCredentials);
        };
        match argon2::verify_encoded(&self.password_hash, password.as_bytes()) {
            Ok(true) => Ok(Identity::shared_admin()),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                // Only reachable if the hash was corrupted after construction.
                error!("Password verification failed: {e}");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

/// Accepts principals from the upstream identity provider that carry an allowed role.
pub struct DelegatedAuthenticator {
    allowed_roles: Vec<String>,
}

impl DelegatedAuthenticator {
    pub fn new(allowed_roles: Vec<String>) -> Self {
        Self { allowed_roles }
    }
}

impl Authenticator for DelegatedAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let Credentials::Principal(principal) = credentials else {
            return Err(AuthError::UnsupportedCredentials);
        };
        if principal.user_id.is_empty() {
            return Err(AuthError::MalformedPrincipal);
        }
        let permitted = principal
            .user_roles
            .iter()
            .any(|role| self.allowed_roles.contains(role));
        if !permitted {
            return Err(AuthError::Forbidden);
        }
        Ok(Identity {
            user_id: principal.user_id.clone(),
            name: principal.user_details.clone(),
            provider: principal.identity_provider.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn password_authenticator(password: &str) -> SharedPasswordAuthenticator {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default()).unwrap();
        SharedPasswordAuthenticator::new(hash).unwrap()
    }

    #[test]
    fn password_strategy() {
        let auth = password_authenticator("hunter22");

        let identity = auth
            .authenticate(&Credentials::Password("hunter22".into()))
            .unwrap();
        assert_eq!(identity, Identity::shared_admin());

        assert_eq!(
            auth.authenticate(&Credentials::Password("hunter23".into())),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.authenticate(&Credentials::Principal(ClientPrincipal::example(&["admin"]))),
            Err(AuthError::UnsupportedCredentials)
        );
    }

    #[test]
    fn malformed_hash_rejected() {
        assert!(SharedPasswordAuthenticator::new("plaintext".into()).is_err());
    }

    #[test]
    fn delegated_strategy() {
        let auth = DelegatedAuthenticator::new(vec!["auditor".into(), "admin".into()]);

        let identity = auth
            .authenticate(&Credentials::Principal(ClientPrincipal::example(&[
                "anonymous",
                "admin",
            ])))
            .unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.name, "u1@x.edu");
        assert_eq!(identity.provider, "aad");

        assert_eq!(
            auth.authenticate(&Credentials::Principal(ClientPrincipal::example(&[
                "anonymous"
            ]))),
            Err(AuthError::Forbidden)
        );
        assert_eq!(
            auth.authenticate(&Credentials::Password("anything".into())),
            Err(AuthError::UnsupportedCredentials)
        );
    }
}
