pub mod commands;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, DetectArgs, RuntimesArgs};
pub use output::{
    BuildReport, DetectionReport, FailureReport, OutputFormat, OutputFormatter, RuntimeReport,
};

/// Build or detection succeeded
pub const EXIT_SUCCESS: i32 = 0;
/// Build or detection failed
pub const EXIT_FAILURE: i32 = 1;
/// Invalid arguments or configuration
pub const EXIT_USAGE: i32 = 2;
