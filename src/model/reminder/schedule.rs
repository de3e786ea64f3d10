use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, error, info, warn};
use mongodb::Database;
use rocket::{
    fairing::{Fairing, Info, Kind},
    futures::future::{BoxFuture, FutureExt},
    tokio::sync::Mutex,
    Build, Orbit, Rocket,
};

use crate::{
    config::Config,
    model::{
        common::{month::MonthKey, reminder::ReminderType},
        email::Mailer,
    },
    scheduled_task::ScheduledTask,
};

use super::ReminderDispatcher;

/// Day of the month on which each reminder goes out.
pub const REMINDER_DAYS: [(u32, ReminderType); 3] = [
    (1, ReminderType::First),
    (15, ReminderType::MidMonth),
    (25, ReminderType::Final),
];

/// The first reminder round strictly after `after`, running at `hour_utc` on its day.
/// Returns `None` only if `hour_utc` is not a valid hour.
pub fn next_reminder(after: DateTime<Utc>, hour_utc: u32) -> Option<(DateTime<Utc>, ReminderType)> {
    let this_month = MonthKey::of(after);
    let next_month = this_month.next();
    [this_month, next_month]
        .iter()
        .flat_map(|month| {
            REMINDER_DAYS.iter().filter_map(move |&(day, reminder_type)| {
                Utc.with_ymd_and_hms(month.year(), month.month(), day, hour_utc, 0, 0)
                    .single()
                    .map(|at| (at, reminder_type))
            })
        })
        .find(|(at, _)| *at > after)
}

/// The next pending round.
struct Pending {
    reminder_type: ReminderType,
    task: ScheduledTask<()>,
}

type Slot = Arc<Mutex<Option<Pending>>>;

/// In-process schedule of reminder rounds. Each round schedules its successor.
pub struct ReminderSchedule {
    dispatcher: Arc<ReminderDispatcher>,
    hour_utc: u32,
    pending: Slot,
}

impl ReminderSchedule {
    pub fn new(dispatcher: ReminderDispatcher, hour_utc: u32) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            hour_utc,
            pending: Default::default(),
        }
    }

    /// Schedule the first round after now, replacing any pending one.
    pub async fn start(&self) {
        let replaced = self.pending.lock().await.take();
        if let Some(pending) = replaced {
            pending.task.cancel().await;
        }
        Self::schedule_after(
            Utc::now(),
            self.dispatcher.clone(),
            self.hour_utc,
            self.pending.clone(),
        )
        .await;
    }

    /// When the next round runs, and which reminder it sends.
    #[cfg(test)]
    pub(crate) async fn next_round(&self) -> Option<(DateTime<Utc>, ReminderType)> {
        self.pending
            .lock()
            .await
            .as_ref()
            .map(|pending| (pending.task.run_at(), pending.reminder_type))
    }

    /// Cancel the pending round, if any. Returns true iff a round was pending.
    pub async fn stop(&self) -> bool {
        match self.pending.lock().await.take() {
            Some(pending) => {
                pending.task.cancel().await;
                true
            }
            None => false,
        }
    }

    async fn schedule_after(
        after: DateTime<Utc>,
        dispatcher: Arc<ReminderDispatcher>,
        hour_utc: u32,
        pending: Slot,
    ) {
        let Some((run_at, reminder_type)) = next_reminder(after, hour_utc) else {
            error!("Cannot schedule reminders at hour {hour_utc}");
            return;
        };
        let round = Self::round(
            run_at,
            reminder_type,
            dispatcher,
            hour_utc,
            pending.clone(),
        );
        let task = ScheduledTask::new(round, run_at);
        *pending.lock().await = Some(Pending {
            reminder_type,
            task,
        });
        info!("Next {reminder_type} reminder round scheduled for {run_at}");
    }

    /// Send one round of reminders, then schedule the next.
    /// Since this is a recursive async function, we must use `BoxFuture` to
    /// avoid an infinitely-recursive state machine.
    fn round(
        run_at: DateTime<Utc>,
        reminder_type: ReminderType,
        dispatcher: Arc<ReminderDispatcher>,
        hour_utc: u32,
        pending: Slot,
    ) -> BoxFuture<'static, ()> {
        async move {
            let month = MonthKey::of(run_at);
            debug!("Running scheduled {reminder_type} reminder round for {month}");
            if let Err(e) = dispatcher.dispatch(reminder_type, &month).await {
                error!("Scheduled {reminder_type} reminder round for {month} failed: {e}");
            }
            Self::schedule_after(run_at, dispatcher, hour_utc, pending).await;
        }
        .boxed()
    }
}

/// A fairing that starts the reminder schedule during ignition, if enabled,
/// and stops it on shutdown. Places a `ReminderSchedule` into managed state.
/// Depends on the config, database and mailer being in managed state, and
/// so must be attached after the fairings responsible for them.
pub struct ReminderScheduleFairing;

#[rocket::async_trait]
impl Fairing for ReminderScheduleFairing {
    fn info(&self) -> Info {
        Info {
            name: "Reminder Schedule",
            kind: Kind::Ignite | Kind::Shutdown,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let (Some(config), Some(db), Some(mailer)) = (
            rocket.state::<Config>(),
            rocket.state::<Database>(),
            rocket.state::<Mailer>(),
        ) else {
            error!("Config, database and mailer must be available before scheduling reminders");
            return Err(rocket);
        };
        if !config.reminder_schedule_enabled() {
            info!("Reminder schedule disabled");
            return Ok(rocket);
        }

        let dispatcher = ReminderDispatcher::new(db, mailer.clone(), config.app_url());
        let schedule = ReminderSchedule::new(dispatcher, config.reminder_hour_utc());
        schedule.start().await;

        rocket = rocket.manage(schedule);
        Ok(rocket)
    }

    async fn on_shutdown(&self, rocket: &Rocket<Orbit>) {
        if let Some(schedule) = rocket.state::<ReminderSchedule>() {
            if schedule.stop().await {
                warn!("Cancelled pending reminder round");
            }
        }
    }
}
