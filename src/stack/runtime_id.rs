use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque language/version identifier such as `nodejs14` or `custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeId(String);

impl RuntimeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for RuntimeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RuntimeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for RuntimeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_id_is_opaque() {
        let id = RuntimeId::from("python3.9");
        assert_eq!(id.as_str(), "python3.9");
        assert_eq!(id.to_string(), "python3.9");
        assert_ne!(id, RuntimeId::from("Python3.9"));
    }

    #[test]
    fn test_runtime_id_serializes_as_string() {
        let id = RuntimeId::new("custom.debian10");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"custom.debian10\""
        );
    }
}
