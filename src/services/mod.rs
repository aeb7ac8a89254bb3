pub mod auth;
pub mod mail;
pub mod metrics;
pub mod storage;
