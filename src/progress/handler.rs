//! Progress handler trait and events

use crate::stack::{RuntimeId, StrategyKind};
use std::time::Duration;

/// Events emitted while a build runs
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// Build accepted
    Started {
        function: String,
        runtime: RuntimeId,
    },

    /// An inline command or script file replaces strategy detection
    OverrideStarted { description: String },

    /// Detection chose a strategy
    Detected {
        strategy: StrategyKind,
        detection_time: Duration,
    },

    /// Strategy execution started
    StrategyStarted {
        strategy: StrategyKind,
        stages: usize,
    },

    /// Strategy finished every stage
    StrategyComplete {
        strategy: StrategyKind,
        duration: Duration,
    },

    /// Build completed successfully
    Completed { total_time: Duration },

    /// Build failed
    Failed { error: String },
}

/// Trait for observing build progress
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &BuildEvent);
}

/// Handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &BuildEvent) {}
}
