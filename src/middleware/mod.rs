/*
 * Responsibility
 * - Request/response interceptors (chain, telemetry, CORS, auth gate)
 * - Transport layers shared by every route (http)
 */
pub mod auth;
pub mod chain;
pub mod cors;
pub mod http;
pub mod recorder;
pub mod telemetry;
