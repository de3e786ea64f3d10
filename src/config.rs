use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use hmac::{Hmac, Mac};
use log::{error, info};
use mongodb::{options::ClientOptions, Client as MongoClient};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;
use sha2::Sha256;

use crate::model::{
    auth::{AuthProvider, AuthStrategy, DelegatedAuthenticator, SharedPasswordAuthenticator},
    email::{Mailer, ResendTransport},
    mongodb::ensure_indexes_exist,
};

type HmacSha256 = Hmac<Sha256>;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    pub(crate) app_url: String,
    pub(crate) auth_ttl: u32,
    #[serde(default)]
    pub(crate) reminder_schedule_enabled: bool,
    #[serde(default = "default_reminder_hour_utc")]
    pub(crate) reminder_hour_utc: u32,
    // secrets
    pub(crate) jwt_secret: String,
    pub(crate) cron_secret: String,
}

fn default_reminder_hour_utc() -> u32 {
    9
}

impl Config {
    /// Base URL of the audit form, linked from reminder emails.
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Whether reminder rounds are run by the server itself.
    pub fn reminder_schedule_enabled(&self) -> bool {
        self.reminder_schedule_enabled
    }

    /// Hour of the day (UTC) at which scheduled reminder rounds run.
    pub fn reminder_hour_utc(&self) -> u32 {
        self.reminder_hour_utc
    }

    /// Compare a presented secret against the cron secret in constant time.
    pub fn cron_secret_matches(&self, presented: &str) -> bool {
        let mac = |value: &str| {
            let mut mac = HmacSha256::new_from_slice(self.jwt_secret())
                .expect("HMAC can take key of any size");
            mac.update(value.as_bytes());
            mac
        };
        let expected = mac(&self.cron_secret).finalize().into_bytes();
        !self.cron_secret.is_empty() && mac(presented).verify_slice(&expected).is_ok()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.reminder_hour_utc > 23 {
            error!(
                "Invalid reminder_hour_utc {}, must be between 0 and 23",
                config.reminder_hour_utc
            );
            return Err(rocket);
        }

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    #[serde(default = "default_db_name")]
    db_name: String,
    #[serde(default = "default_db_max_pool_size")]
    db_max_pool_size: u32,
    #[serde(default = "default_db_max_idle_secs")]
    db_max_idle_secs: u64,
    // secrets
    db_uri: String,
}

fn default_db_name() -> String {
    "audit".to_string()
}

fn default_db_max_pool_size() -> u32 {
    10
}

fn default_db_max_idle_secs() -> u64 {
    300
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection pool.
        let mut options = match ClientOptions::parse(&config.db_uri).await {
            Ok(options) => options,
            Err(e) => {
                error!("Invalid database URI: {e}");
                return Err(rocket);
            }
        };
        options.max_pool_size = Some(config.db_max_pool_size);
        options.max_idle_time = Some(StdDuration::from_secs(config.db_max_idle_secs));
        let client = match MongoClient::with_options(options) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Configuration for the email API.
#[derive(Deserialize)]
struct MailerConfig {
    // non-secrets
    email_from: String,
    email_endpoint: Option<String>,
    // secrets
    resend_api_key: String,
}

/// A fairing that loads the email config and places a `Mailer` into managed state.
pub struct MailerFairing;

#[rocket::async_trait]
impl Fairing for MailerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Resend Mailer",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<MailerConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load email config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let endpoint = config
            .email_endpoint
            .unwrap_or_else(|| ResendTransport::DEFAULT_ENDPOINT.to_string());
        info!("Sending email from {} via {endpoint}", config.email_from);
        let mailer: Mailer = Arc::new(ResendTransport::new(
            endpoint,
            config.resend_api_key,
            config.email_from,
        ));

        // Manage the state.
        rocket = rocket.manage(mailer);
        Ok(rocket)
    }
}

/// Configuration for authentication.
#[derive(Deserialize)]
struct AuthConfig {
    auth_strategy: AuthStrategy,
    #[serde(default = "default_allowed_roles")]
    allowed_roles: Vec<String>,
    // secrets
    admin_password_hash: Option<String>,
}

fn default_allowed_roles() -> Vec<String> {
    vec!["authenticated".to_string()]
}

/// A fairing that loads the authentication config and places the chosen
/// `AuthProvider` into managed state.
pub struct AuthFairing;

#[rocket::async_trait]
impl Fairing for AuthFairing {
    fn info(&self) -> Info {
        Info {
            name: "Authentication",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<AuthConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load authentication config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let provider: AuthProvider = match config.auth_strategy {
            AuthStrategy::Password => {
                let Some(hash) = config.admin_password_hash else {
                    error!("auth_strategy is password but admin_password_hash is not set");
                    return Err(rocket);
                };
                match SharedPasswordAuthenticator::new(hash) {
                    Ok(authenticator) => Box::new(authenticator),
                    Err(e) => {
                        error!("Invalid admin_password_hash: {e}");
                        return Err(rocket);
                    }
                }
            }
            AuthStrategy::Delegated => {
                Box::new(DelegatedAuthenticator::new(config.allowed_roles))
            }
        };
        info!("Using {:?} authentication", config.auth_strategy);

        // Manage the state.
        rocket = rocket.manage(provider);
        Ok(rocket)
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self {
                app_url: "https://audit.example.edu/".to_string(),
                auth_ttl: 3600,
                reminder_schedule_enabled: false,
                reminder_hour_utc: 9,
                jwt_secret: "test jwt secret".to_string(),
                cron_secret: "test cron secret".to_string(),
            }
        }
    }
}
