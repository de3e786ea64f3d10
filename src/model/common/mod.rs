//! Types shared between the database and API representations.

pub mod area;
pub mod month;
pub mod reminder;
