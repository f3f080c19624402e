//! HTTP surface of the link service: public redirects, the keep-alive probe
//! and the admin JSON API.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use state::{AppState, GatewaySettings};
