//! Same-source filtering for the scoring run.
//! When enabled, rows that share a source tag are never compared with each other.

use log::{debug, info, warn};
use std::collections::HashSet;

use crate::utils::env::env_flag;

#[derive(Debug, Clone, Default)]
pub struct SourceFilterConfig {
    pub enabled: bool,
}

impl SourceFilterConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let enabled = env_flag("DEDUPE_IGNORE_SAME_SOURCE", false);
        debug!("Source filter config: enabled={}", enabled);
        Self { enabled }
    }

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        if self.enabled {
            info!("🔍 Same-source filtering ENABLED");
            info!("   Rows sharing a source tag will not be scored against each other");
        } else {
            info!("🔍 Same-source filtering DISABLED - scoring all pairs");
        }
    }

    /// Check the source column before it is handed to the scorers.
    /// Returns the number of distinct sources.
    pub fn inspect_sources(&self, sources: &[String]) -> usize {
        let distinct: HashSet<&str> = sources.iter().map(String::as_str).collect();
        if self.enabled && distinct.len() == 1 && sources.len() > 1 {
            warn!(
                "⚠️ All {} rows share the source {:?}; every pair will be excluded",
                sources.len(),
                sources[0]
            );
        }
        info!("   {} distinct sources across {} rows", distinct.len(), sources.len());
        distinct.len()
    }

    pub fn is_active(&self) -> bool {
        self.enabled
    }
}
