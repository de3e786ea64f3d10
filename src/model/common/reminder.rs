use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three escalating reminder stages within a month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    /// Sent when the month's audit opens.
    First,
    /// Sent with roughly half the month remaining.
    MidMonth,
    /// Sent shortly before the month closes.
    Final,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid reminder type. Must be: first, mid_month, or final")]
pub struct ReminderTypeError;

impl ReminderType {
    pub const ALL: [ReminderType; 3] = [Self::First, Self::MidMonth, Self::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::MidMonth => "mid_month",
            Self::Final => "final",
        }
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = ReminderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(ReminderTypeError)
    }
}

impl From<ReminderType> for Bson {
    fn from(reminder_type: ReminderType) -> Self {
        Bson::String(reminder_type.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("first".parse(), Ok(ReminderType::First));
        assert_eq!("mid_month".parse(), Ok(ReminderType::MidMonth));
        assert_eq!("final".parse(), Ok(ReminderType::Final));
        assert_eq!("midMonth".parse::<ReminderType>(), Err(ReminderTypeError));
        assert_eq!("".parse::<ReminderType>(), Err(ReminderTypeError));
    }

    #[test]
    fn serde_matches_display() {
        for reminder_type in ReminderType::ALL {
            let json = rocket::serde::json::to_string(&reminder_type).unwrap();
            assert_eq!(json, format!("\"{reminder_type}\""));
        }
    }
}
