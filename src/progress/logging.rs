//! Logging-based progress handler

use super::{BuildEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &BuildEvent) {
        match event {
            BuildEvent::Started { function, runtime } => {
                info!(function = %function, runtime = %runtime, "Starting build");
            }
            BuildEvent::OverrideStarted { description } => {
                info!(build_override = %description, "Running build override");
            }
            BuildEvent::Detected {
                strategy,
                detection_time,
            } => {
                info!(
                    strategy = %strategy,
                    detection_time_ms = detection_time.as_millis(),
                    "Strategy selected"
                );
            }
            BuildEvent::StrategyStarted { strategy, stages } => {
                info!(strategy = %strategy, stages, "Starting strategy");
            }
            BuildEvent::StrategyComplete { strategy, duration } => {
                info!(
                    strategy = %strategy,
                    duration_ms = duration.as_millis(),
                    "Strategy complete"
                );
            }
            BuildEvent::Completed { total_time } => {
                info!(total_time_ms = total_time.as_millis(), "Build complete");
            }
            BuildEvent::Failed { error } => {
                warn!(error = %error, "Build failed");
            }
        }
    }
}
