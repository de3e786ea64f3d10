//! Outgoing email: message rendering and the transport that delivers it.

mod template;
mod transport;

pub use template::{reminder_email, ReminderContext, FINAL_REMINDER_DAYS_REMAINING};
pub use transport::{Email, EmailTransport, Mailer, ResendTransport, TransportError};

#[cfg(test)]
pub use transport::RecordingTransport;
