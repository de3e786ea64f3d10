#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{AuthFairing, ConfigFairing, DatabaseFairing, MailerFairing};
use crate::logging::LoggerFairing;
use crate::model::reminder::ReminderScheduleFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod scheduled_task;

/// Assemble the server. Fairings run in the order attached, and the reminder
/// schedule needs everything before it.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(MailerFairing)
        .attach(AuthFairing)
        .attach(ReminderScheduleFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// The shared admin password accepted by test servers.
#[cfg(test)]
pub(crate) const TEST_PASSWORD: &str = "correct horse battery staple";

/// Connect to the database server named by `db_uri` in the usual config.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(db_uri).await.unwrap()
}

/// Get the name of a fresh database.
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// A server using the given database and mailer, with password authentication
/// for [`TEST_PASSWORD`] and the in-process schedule disabled.
#[cfg(test)]
pub(crate) async fn rocket_for_db_and_mailer(
    client: mongodb::Client,
    db_name: &str,
    mailer: model::email::Mailer,
) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();

    let salt: [u8; 16] = rand::random();
    let password_hash =
        argon2::hash_encoded(TEST_PASSWORD.as_bytes(), &salt, &argon2::Config::default()).unwrap();
    let figment = rocket::Config::figment()
        .merge(("app_url", "https://audit.example.edu/"))
        .merge(("auth_ttl", 3600))
        .merge(("jwt_secret", "test jwt secret"))
        .merge(("cron_secret", "test cron secret"))
        .merge(("reminder_schedule_enabled", false))
        .merge(("auth_strategy", "password"))
        .merge(("admin_password_hash", password_hash));

    rocket::custom(figment)
        .attach(ConfigFairing)
        .attach(AuthFairing)
        .attach(ReminderScheduleFairing)
        .manage(client)
        .manage(db)
        .manage(mailer)
        .mount("/", api::routes())
        .register("/", api::catchers())
}
