use serde::{Deserialize, Serialize};
use std::fmt;

/// Glob pattern, relative to the source directory, whose match selects a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestPattern(String);

impl ManifestPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManifestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Build strategy identifier, one variant per supported ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Npm,
    Pip,
    Maven,
    Composer,
    Dotnet,
    /// Fallback when no manifest matches. Never registered against a runtime.
    Default,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Npm,
        StrategyKind::Pip,
        StrategyKind::Maven,
        StrategyKind::Composer,
        StrategyKind::Dotnet,
        StrategyKind::Default,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Npm => "npm",
            StrategyKind::Pip => "pip",
            StrategyKind::Maven => "maven",
            StrategyKind::Composer => "composer",
            StrategyKind::Dotnet => "dotnet",
            StrategyKind::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Manifest this strategy claims, `None` for the fallback.
    pub fn manifest_pattern(&self) -> Option<ManifestPattern> {
        let pattern = match self {
            StrategyKind::Npm => "package.json",
            StrategyKind::Pip => "requirements.txt",
            StrategyKind::Maven => "pom.xml",
            StrategyKind::Composer => "composer.json",
            StrategyKind::Dotnet => "*.csproj",
            StrategyKind::Default => return None,
        };
        Some(ManifestPattern::new(pattern))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
