//! Progress reporting for builds

mod handler;
mod logging;

pub use handler::{BuildEvent, NoOpHandler, ProgressHandler};
pub use logging::LoggingHandler;
