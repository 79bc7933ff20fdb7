//! Manifest based strategy detection

use crate::stack::{ManifestPattern, RuntimeId, StrategyKind, StrategyRegistry};
use glob::{MatchOptions, Pattern};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Unknown runtime: {0}")]
    UnknownRuntime(RuntimeId),

    #[error("Source directory {path} is not readable: {source}")]
    SourceUnreadable { path: PathBuf, source: io::Error },
}

/// Chooses exactly one strategy for a runtime and source directory.
pub trait StrategyDetector: Send + Sync {
    fn detect(&self, runtime: &RuntimeId, source_dir: &Path) -> Result<StrategyKind, DetectError>;
}

/// Detector that globs each candidate's manifest pattern under the source dir.
///
/// The first candidate, in registration order, with at least one match wins.
/// No match at all selects [`StrategyKind::Default`].
#[derive(Debug, Clone)]
pub struct ManifestDetector {
    registry: Arc<StrategyRegistry>,
}

impl ManifestDetector {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self { registry }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(StrategyRegistry::with_defaults()))
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }
}

impl Default for ManifestDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StrategyDetector for ManifestDetector {
    fn detect(&self, runtime: &RuntimeId, source_dir: &Path) -> Result<StrategyKind, DetectError> {
        let candidates = self
            .registry
            .lookup(runtime)
            .ok_or_else(|| DetectError::UnknownRuntime(runtime.clone()))?;

        std::fs::read_dir(source_dir).map_err(|source| DetectError::SourceUnreadable {
            path: source_dir.to_path_buf(),
            source,
        })?;

        let selected = candidates.iter().find(|candidate| {
            let matched = manifest_matches(source_dir, &candidate.pattern);
            debug!(
                runtime = %runtime,
                pattern = %candidate.pattern,
                strategy = %candidate.kind,
                matched,
                "Checked manifest"
            );
            matched
        });

        let kind = selected.map(|c| c.kind).unwrap_or(StrategyKind::Default);
        info!(
            runtime = %runtime,
            source_dir = %source_dir.display(),
            strategy = %kind,
            "Detected build strategy"
        );
        Ok(kind)
    }
}

/// True when `pattern`, rooted at `source_dir`, matches at least one entry.
///
/// `*` does not cross directory separators, so only `**` patterns recurse.
/// Wildcards never match hidden entries. Glob failures count as no match.
pub fn manifest_matches(source_dir: &Path, pattern: &ManifestPattern) -> bool {
    let root = Pattern::escape(&source_dir.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern.as_str());

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let paths = match glob::glob_with(&full, options) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Invalid manifest pattern");
            return false;
        }
    };

    paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Skipping unreadable glob entry");
                None
            }
        })
        .next()
        .is_some()
}
