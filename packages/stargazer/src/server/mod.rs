//! JSON intake API served by the `web` subcommand.

pub mod app;
pub mod routes;

pub use app::{build_app, AppState};
