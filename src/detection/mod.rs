//! Strategy detection for a runtime and source directory

pub mod detector;

pub use detector::{manifest_matches, DetectError, ManifestDetector, StrategyDetector};
