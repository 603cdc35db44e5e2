//! Depth sensing capability of the host device

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the session can deliver scene depth.
///
/// Without depth the proximity engine runs inert; detection still works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthCapability {
    #[default]
    Supported,
    Unsupported,
}

impl DepthCapability {
    pub fn from_supported(supported: bool) -> Self {
        if supported {
            DepthCapability::Supported
        } else {
            DepthCapability::Unsupported
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, DepthCapability::Supported)
    }
}

impl fmt::Display for DepthCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthCapability::Supported => f.write_str("supported"),
            DepthCapability::Unsupported => f.write_str("unsupported"),
        }
    }
}
