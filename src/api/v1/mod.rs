/*
 * Responsibility
 * - v1 entry points (re-export of routes())
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
