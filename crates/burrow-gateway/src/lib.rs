//! HTTP front end for the burrow link service.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
