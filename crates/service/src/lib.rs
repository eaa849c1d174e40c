//! Traced request handling for the three-tier demo chain.
//!
//! Every endpoint runs the same protocol from [`handler::handle`]: open a
//! span, sleep a random while, draw an outcome, either fail fast or call the
//! next tier, then answer and close the span. Logging goes through
//! [`log::RequestLog`], which is handed the span's ids explicitly.

pub mod downstream;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod log;
pub mod propagation;
pub mod router;
pub mod server;
pub mod span;

pub use router::{AppState, router};
pub use span::INSTRUMENTATION_NAME;
