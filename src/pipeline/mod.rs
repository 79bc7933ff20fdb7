//! Build pipeline: request in, outcome or classified error out.

pub mod error;
pub mod orchestrator;
pub mod request;

pub use error::{BuildError, FailurePhase};
pub use orchestrator::{with_runtime, BuildOrchestrator};
pub use request::{BuildOutcome, BuildPayload, BuildRequest};
