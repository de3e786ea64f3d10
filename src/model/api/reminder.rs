use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{month::MonthKey, reminder::ReminderType},
    reminder::DispatchReport,
};

/// A request to send one round of reminders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    pub reminder_type: Option<String>,
    /// Defaults to the current month.
    pub month: Option<String>,
}

impl ReminderRequest {
    pub fn validate(self) -> Result<(ReminderType, MonthKey)> {
        let reminder_type = parse_reminder_type(self.reminder_type.as_deref().unwrap_or_default())?;
        let month = match self.month.filter(|m| !m.is_empty()) {
            Some(month) => month
                .parse()
                .map_err(|e| Error::BadRequest(format!("{e}")))?,
            None => MonthKey::current(),
        };
        Ok((reminder_type, month))
    }
}

/// `GET /cron/monthly-reminders` body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronRunResult {
    pub success: bool,
    pub reminder_type: ReminderType,
    pub month: MonthKey,
    pub result: DispatchReport,
}

pub fn parse_reminder_type(s: &str) -> Result<ReminderType> {
    s.parse().map_err(|e| Error::BadRequest(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_defaults_to_current() {
        let request = ReminderRequest {
            reminder_type: Some("final".into()),
            month: None,
        };
        let (reminder_type, month) = request.validate().unwrap();
        assert_eq!(reminder_type, ReminderType::Final);
        assert_eq!(month, MonthKey::current());
    }

    #[test]
    fn invalid_type_rejected() {
        for reminder_type in [None, Some("weekly".to_string())] {
            let request = ReminderRequest {
                reminder_type,
                month: Some("2025-02".into()),
            };
            assert!(matches!(request.validate(), Err(Error::BadRequest(_))));
        }
    }

    #[test]
    fn invalid_month_rejected() {
        let request = ReminderRequest {
            reminder_type: Some("first".into()),
            month: Some("2025-2".into()),
        };
        assert!(matches!(request.validate(), Err(Error::BadRequest(_))));
    }
}
