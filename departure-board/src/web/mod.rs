//! Web layer for the departure board sensors.
//!
//! Provides HTTP endpoints exposing each configured station's sensor state.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
