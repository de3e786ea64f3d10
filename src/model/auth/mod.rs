//! Authentication: who is making a request, and how they proved it.

mod authenticator;
mod identity;
mod principal;
mod token;

pub use authenticator::{
    AuthError, AuthProvider, AuthStrategy, Authenticator, Credentials, DelegatedAuthenticator,
    SharedPasswordAuthenticator,
};
pub use identity::Identity;
pub use principal::{ClientPrincipal, CLIENT_PRINCIPAL_HEADER};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
