//! Runtime and strategy identifiers plus the registry binding them.
//!
//! A runtime (`nodejs14`, `custom`, ...) maps to an ordered list of candidate
//! strategies, each keyed by the manifest pattern it claims. Detection walks
//! that list in registration order; see [`crate::detection`].

#[macro_use]
pub mod id_enum_macro;

pub mod registry;
pub mod runtime_id;
pub mod stage;
pub mod strategy_kind;

pub use registry::{Candidate, RegistryError, StrategyRegistry};
pub use runtime_id::RuntimeId;
pub use stage::Stage;
pub use strategy_kind::{ManifestPattern, StrategyKind};
