pub mod auth;
pub mod files;
pub mod mail;
pub mod users;
