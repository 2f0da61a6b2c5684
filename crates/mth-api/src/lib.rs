//! HTTP service of the Mathisi scheduler.
//!
//! Wires the SRS core and a card store into an axum router: study sessions,
//! review submission and progress statistics.

pub mod clock;
pub mod config;
pub mod error;
pub mod learning;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;
pub mod tracing;

pub use clock::{Clock, ControlledClock, SystemClock};
pub use config::ApiConfig;
pub use learning::LearningService;
pub use state::ApiState;
