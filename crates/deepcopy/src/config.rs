//! Clone options.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `DEEPCOPY_MAX_DEPTH` | Maximum composite nesting depth (default: unlimited) |
//! | `DEEPCOPY_STRATEGY` | `recursive`, `worklist` or `serializing` (default: `recursive`) |

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_MAX_DEPTH: &str = "DEEPCOPY_MAX_DEPTH";
pub const ENV_STRATEGY: &str = "DEEPCOPY_STRATEGY";

/// How [`crate::Cloner`] walks the value graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Native recursion; depth is bounded by the thread stack.
    #[default]
    Recursive,
    /// Explicit heap-allocated stack; same result as `Recursive`.
    Worklist,
    /// JSON round-trip. Lossy and fails on cycles.
    Serializing,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recursive" => Some(Self::Recursive),
            "worklist" => Some(Self::Worklist),
            "serializing" => Some(Self::Serializing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Worklist => "worklist",
            Self::Serializing => "serializing",
        }
    }
}

/// Options for [`crate::Cloner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneOptions {
    /// Maximum composite nesting depth. The outermost sequence or record is
    /// depth 1. `None` means unlimited.
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default)]
    pub strategy: Strategy,
}

impl CloneOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Create options from environment variables. Unset or invalid values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_depth = lookup(ENV_MAX_DEPTH).and_then(|raw| match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => {
                warn!(value = %raw, "ignoring invalid {}", ENV_MAX_DEPTH);
                None
            }
            Ok(depth) => Some(depth),
        });

        let strategy = lookup(ENV_STRATEGY)
            .and_then(|raw| {
                let parsed = Strategy::parse(&raw);
                if parsed.is_none() {
                    warn!(value = %raw, "ignoring unknown {}", ENV_STRATEGY);
                }
                parsed
            })
            .unwrap_or_default();

        Self {
            max_depth,
            strategy,
        }
    }
}
