//! HTTP front end for the survey flow: axum routes, client cookies, startup.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod startup;

pub use config::Args;
pub use error::AppError;
pub use routes::{AppState, path_for, router};
