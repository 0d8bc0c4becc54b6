//! HTTP server exposing the assessment flow.
//!
//! See [`routes`] for the route table and handlers.

pub mod routes;

pub use routes::{app_router, AppState};
