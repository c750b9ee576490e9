//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

use crate::feed::DEFAULT_CHANNEL_CAPACITY;

/// Spec file shown when none is configured
pub const DEFAULT_SPEC_FILE: &str = "./goss.yaml";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Spec file identifier (default: "./goss.yaml")
    pub spec_file: String,

    /// Format options (default: none)
    pub format_options: Vec<String>,

    /// Batches buffered between feed and aggregator (default: 64)
    pub channel_capacity: usize,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            spec_file: DEFAULT_SPEC_FILE.to_string(),
            format_options: Vec::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "spec_file": self.spec_file,
            "format_options": self.format_options,
            "feed": {
                "channel_capacity": self.channel_capacity
            }
        })
    }
}
