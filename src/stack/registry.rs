//! Runtime to build strategy registry

use super::{ManifestPattern, RuntimeId, StrategyKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Built-in runtime table, in registration order.
///
/// `custom.debian10` admits pip only (devsapp/fc#501).
const DEFAULT_RUNTIMES: &[(&str, &[StrategyKind])] = &[
    ("java8", &[StrategyKind::Maven]),
    ("java11", &[StrategyKind::Maven]),
    ("nodejs8", &[StrategyKind::Npm]),
    ("nodejs6", &[StrategyKind::Npm]),
    ("nodejs10", &[StrategyKind::Npm]),
    ("nodejs12", &[StrategyKind::Npm]),
    ("nodejs14", &[StrategyKind::Npm]),
    ("python2.7", &[StrategyKind::Pip]),
    ("python3", &[StrategyKind::Pip]),
    ("python3.9", &[StrategyKind::Pip]),
    ("python3.10", &[StrategyKind::Pip]),
    ("php7.2", &[StrategyKind::Composer]),
    (
        "custom",
        &[StrategyKind::Npm, StrategyKind::Pip, StrategyKind::Composer],
    ),
    ("custom.debian10", &[StrategyKind::Pip]),
    ("dotnetcore2.1", &[StrategyKind::Dotnet]),
];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Runtime {runtime} already maps manifest '{pattern}' to a strategy")]
    DuplicatePattern {
        runtime: RuntimeId,
        pattern: ManifestPattern,
    },

    #[error("The default strategy cannot be registered for runtime {0}")]
    DefaultNotRegistrable(RuntimeId),

    #[error("Invalid registry overlay: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read registry overlay {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// One (manifest pattern, strategy) pair in a runtime's candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pattern: ManifestPattern,
    pub kind: StrategyKind,
}

#[derive(Debug, Clone)]
struct RuntimeEntry {
    runtime: RuntimeId,
    candidates: Vec<Candidate>,
}

/// Ordered table of runtime id to candidate strategies
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    entries: Vec<RuntimeEntry>,
    runtime_index: HashMap<RuntimeId, usize>,
}

#[derive(Debug, Deserialize)]
struct RegistryOverlay {
    #[serde(default)]
    runtime: Vec<OverlayRuntime>,
}

#[derive(Debug, Deserialize)]
struct OverlayRuntime {
    name: RuntimeId,
    strategies: Vec<StrategyKind>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (runtime, kinds) in DEFAULT_RUNTIMES {
            let runtime = RuntimeId::from(*runtime);
            for kind in kinds.iter() {
                if let Some(pattern) = kind.manifest_pattern() {
                    registry.push(runtime.clone(), pattern, *kind);
                }
            }
        }
        registry
    }

    /// Registers `kind` for `runtime` under the manifest pattern it claims.
    pub fn register(
        &mut self,
        runtime: impl Into<RuntimeId>,
        kind: StrategyKind,
    ) -> Result<(), RegistryError> {
        let runtime = runtime.into();
        let pattern = kind
            .manifest_pattern()
            .ok_or_else(|| RegistryError::DefaultNotRegistrable(runtime.clone()))?;
        self.register_pattern(runtime, pattern, kind)
    }

    /// Registers `kind` for `runtime` under an explicit manifest pattern.
    pub fn register_pattern(
        &mut self,
        runtime: impl Into<RuntimeId>,
        pattern: ManifestPattern,
        kind: StrategyKind,
    ) -> Result<(), RegistryError> {
        let runtime = runtime.into();
        if kind == StrategyKind::Default {
            return Err(RegistryError::DefaultNotRegistrable(runtime));
        }

        if let Some(candidates) = self.lookup(&runtime) {
            if candidates.iter().any(|c| c.pattern == pattern) {
                return Err(RegistryError::DuplicatePattern { runtime, pattern });
            }
        }

        self.push(runtime, pattern, kind);
        Ok(())
    }

    fn push(&mut self, runtime: RuntimeId, pattern: ManifestPattern, kind: StrategyKind) {
        let idx = match self.runtime_index.get(&runtime) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(RuntimeEntry {
                    runtime: runtime.clone(),
                    candidates: Vec::new(),
                });
                self.runtime_index.insert(runtime, idx);
                idx
            }
        };

        self.entries[idx].candidates.push(Candidate { pattern, kind });
    }

    /// Candidate strategies for a runtime, in registration order
    pub fn lookup(&self, runtime: &RuntimeId) -> Option<&[Candidate]> {
        self.runtime_index
            .get(runtime)
            .map(|&idx| self.entries[idx].candidates.as_slice())
    }

    pub fn contains(&self, runtime: &RuntimeId) -> bool {
        self.runtime_index.contains_key(runtime)
    }

    /// Registered runtimes, in registration order
    pub fn runtimes(&self) -> impl Iterator<Item = &RuntimeId> {
        self.entries.iter().map(|e| &e.runtime)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges a TOML overlay of the form
    /// `[[runtime]] name = "nodejs16" strategies = ["npm"]`.
    ///
    /// The overlay is applied all-or-nothing.
    pub fn merge_toml(&mut self, overlay: &str) -> Result<(), RegistryError> {
        let overlay: RegistryOverlay = toml::from_str(overlay)?;

        let mut merged = self.clone();
        for runtime in overlay.runtime {
            for kind in runtime.strategies {
                merged.register(runtime.name.clone(), kind)?;
            }
        }

        *self = merged;
        Ok(())
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<(), RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(registry: &StrategyRegistry, runtime: &str) -> Vec<StrategyKind> {
        registry
            .lookup(&RuntimeId::from(runtime))
            .unwrap()
            .iter()
            .map(|c| c.kind)
            .collect()
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.len(), DEFAULT_RUNTIMES.len());
        assert_eq!(kinds(&registry, "nodejs14"), vec![StrategyKind::Npm]);
        assert_eq!(kinds(&registry, "java11"), vec![StrategyKind::Maven]);
        assert_eq!(kinds(&registry, "dotnetcore2.1"), vec![StrategyKind::Dotnet]);
    }

    #[test]
    fn test_custom_runtime_keeps_registration_order() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(
            kinds(&registry, "custom"),
            vec![StrategyKind::Npm, StrategyKind::Pip, StrategyKind::Composer]
        );
        assert_eq!(kinds(&registry, "custom.debian10"), vec![StrategyKind::Pip]);
    }

    #[test]
    fn test_unknown_runtime() {
        let registry = StrategyRegistry::with_defaults();
        assert!(registry.lookup(&RuntimeId::from("go1")).is_none());
        assert!(!registry.contains(&RuntimeId::from("go1")));
    }

    #[test]
    fn test_runtimes_in_registration_order() {
        let registry = StrategyRegistry::with_defaults();
        let first: Vec<&str> = registry.runtimes().take(3).map(|r| r.as_str()).collect();
        assert_eq!(first, vec!["java8", "java11", "nodejs8"]);
    }

    #[test]
    fn test_register_rejects_duplicate_pattern() {
        let mut registry = StrategyRegistry::new();
        registry.register("nodejs16", StrategyKind::Npm).unwrap();

        let err = registry.register("nodejs16", StrategyKind::Npm).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePattern { .. }));

        // Same pattern under another runtime is fine
        registry.register("nodejs18", StrategyKind::Npm).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_rejects_default() {
        let mut registry = StrategyRegistry::new();
        let err = registry.register("custom", StrategyKind::Default).unwrap_err();
        assert!(matches!(err, RegistryError::DefaultNotRegistrable(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_merge_toml_adds_and_appends() {
        let mut registry = StrategyRegistry::with_defaults();
        registry
            .merge_toml(
                r#"
                [[runtime]]
                name = "nodejs16"
                strategies = ["npm"]

                [[runtime]]
                name = "custom.debian10"
                strategies = ["npm"]
                "#,
            )
            .unwrap();

        assert_eq!(kinds(&registry, "nodejs16"), vec![StrategyKind::Npm]);
        assert_eq!(
            kinds(&registry, "custom.debian10"),
            vec![StrategyKind::Pip, StrategyKind::Npm]
        );
    }

    #[test]
    fn test_merge_toml_is_all_or_nothing() {
        let mut registry = StrategyRegistry::with_defaults();
        let before = registry.len();

        let err = registry
            .merge_toml(
                r#"
                [[runtime]]
                name = "nodejs16"
                strategies = ["npm"]

                [[runtime]]
                name = "custom"
                strategies = ["npm"]
                "#,
            )
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicatePattern { .. }));
        assert_eq!(registry.len(), before);
        assert!(!registry.contains(&RuntimeId::from("nodejs16")));
    }

    #[test]
    fn test_merge_toml_unknown_strategy() {
        let mut registry = StrategyRegistry::new();
        let err = registry
            .merge_toml("[[runtime]]\nname = \"go1\"\nstrategies = [\"gomod\"]\n")
            .unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }
}
