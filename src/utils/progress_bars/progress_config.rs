// src/utils/progress_bars/progress_config.rs

use indicatif::ProgressBar;

use crate::utils::env::env_flag;

/// Configuration for progress tracking throughout a run
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
    /// Whether to log memory usage around the scoring phase
    pub show_memory: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_memory: true,
        }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("PROGRESS_ENABLED", true),
            show_memory: env_flag("PROGRESS_SHOW_MEMORY", true),
        }
    }

    /// Create a partition progress bar if progress is enabled, None otherwise
    pub fn create_progress_bar(&self) -> Option<ProgressBar> {
        if self.enabled {
            Some(ProgressBar::new(0))
        } else {
            None
        }
    }

    /// Check if memory usage should be shown
    pub fn should_show_memory(&self) -> bool {
        self.enabled && self.show_memory
    }
}
