//! Configuration merge system
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. Config file (`--config`, TOML)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_SPEC_FILE};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, FeedConfig, OutputConfig};
pub use merge::{deep_merge, merge_layers};
