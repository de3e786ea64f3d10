pub mod api;
pub mod auth;
pub mod common;
pub mod db;
pub mod email;
pub mod mongodb;
pub mod reminder;
