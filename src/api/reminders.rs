use log::{error, info, warn};
use mongodb::Database;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    serde::json::Json,
    Request, Route, State,
};

use crate::{
    api::{json_body, JsonBody},
    config::Config,
    error::{Error, Result},
    model::{
        api::reminder::{parse_reminder_type, CronRunResult, ReminderRequest},
        auth::Identity,
        common::{month::MonthKey, reminder::ReminderType},
        email::Mailer,
        reminder::{DispatchReport, ReminderDispatcher},
    },
};

pub fn routes() -> Vec<Route> {
    routes![send_reminders, monthly_reminders]
}

/// The caller presented the cron secret as a bearer token.
pub struct CronSecret;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CronSecret {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            error!("Config is not managed");
            return Outcome::Error((
                Status::InternalServerError,
                Error::Unauthorized("Authentication unavailable".into()),
            ));
        };
        let presented = req
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix("Bearer "));
        match presented {
            Some(secret) if config.cron_secret_matches(secret) => Outcome::Success(CronSecret),
            _ => {
                warn!("Rejected request with missing or incorrect cron secret");
                Outcome::Error((
                    Status::Unauthorized,
                    Error::Unauthorized("Invalid cron secret".into()),
                ))
            }
        }
    }
}

/// Who is allowed to trigger a reminder round: the scheduler, via the cron
/// secret, or a signed-in admin.
pub enum ReminderCaller {
    Cron,
    Admin(Identity),
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ReminderCaller {
    type Error = Error;

    /// An `Authorization` header must carry the cron secret; without one,
    /// fall back to the signed-in identity.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        if req.headers().contains("Authorization") {
            req.guard::<CronSecret>().await.map(|_| ReminderCaller::Cron)
        } else {
            req.guard::<Identity>().await.map(ReminderCaller::Admin)
        }
    }
}

#[post("/reminders/send", data = "<body>", format = "json")]
pub async fn send_reminders(
    caller: ReminderCaller,
    body: JsonBody<'_, ReminderRequest>,
    db: &State<Database>,
    mailer: &State<Mailer>,
    config: &State<Config>,
) -> Result<Json<DispatchReport>> {
    let (reminder_type, month) = json_body(body)?.validate()?;
    match caller {
        ReminderCaller::Cron => {}
        ReminderCaller::Admin(identity) => info!(
            "{} triggered {reminder_type} reminders for {month}",
            identity.user_id
        ),
    }
    let dispatcher = ReminderDispatcher::new(db, mailer.inner().clone(), config.app_url());
    let report = dispatcher.dispatch(reminder_type, &month).await?;
    Ok(Json(report))
}

/// Query string of the cron trigger.
#[derive(FromForm)]
pub struct CronQuery<'r> {
    #[field(name = "type")]
    reminder_type: Option<&'r str>,
}

/// Entry point for the external scheduler. Always targets the current month.
#[get("/cron/monthly-reminders?<query..>")]
pub async fn monthly_reminders(
    _secret: CronSecret,
    query: CronQuery<'_>,
    db: &State<Database>,
    mailer: &State<Mailer>,
    config: &State<Config>,
) -> Result<Json<CronRunResult>> {
    let reminder_type = match query.reminder_type {
        Some(reminder_type) => parse_reminder_type(reminder_type)?,
        None => ReminderType::First,
    };
    let month = MonthKey::current();
    let dispatcher = ReminderDispatcher::new(db, mailer.inner().clone(), config.app_url());
    let result = dispatcher.dispatch(reminder_type, &month).await?;
    Ok(Json(CronRunResult {
        success: true,
        reminder_type,
        month,
        result,
    }))
}
