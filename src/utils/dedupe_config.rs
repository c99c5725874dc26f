// src/utils/dedupe_config.rs
use anyhow::{bail, Context, Result};
use log::info;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use crate::matching::manager::default_worker_count;
use crate::models::core::{parse_column_specs, ColumnKind, ColumnSpec};
use crate::utils::constants::{
    DEFAULT_COLUMNS, DEFAULT_ID_COLUMN, DEFAULT_OUTPUT_PATH, DEFAULT_SCORE_HEADER,
    DEFAULT_SOURCE_COLUMN,
};
use crate::utils::source_filter::SourceFilterConfig;

/// Everything a scoring run needs besides the input file.
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub workers: usize,
    pub id_column: usize,
    pub source_column: usize,
    pub columns: Vec<ColumnSpec>,
    pub source_filter: SourceFilterConfig,
    pub output_path: PathBuf,
    pub score_header: String,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            id_column: DEFAULT_ID_COLUMN,
            source_column: DEFAULT_SOURCE_COLUMN,
            columns: parse_column_specs(DEFAULT_COLUMNS).unwrap_or_default(),
            source_filter: SourceFilterConfig::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            score_header: DEFAULT_SCORE_HEADER.to_string(),
        }
    }
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}

impl DedupeConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(workers) = env_usize("DEDUPE_WORKERS")? {
            config.workers = workers;
        }
        if let Some(id_column) = env_usize("DEDUPE_ID_COLUMN")? {
            config.id_column = id_column;
        }
        if let Some(source_column) = env_usize("DEDUPE_SOURCE_COLUMN")? {
            config.source_column = source_column;
        }
        if let Ok(raw) = env::var("DEDUPE_COLUMNS") {
            config.columns = parse_column_specs(&raw).context("Invalid DEDUPE_COLUMNS")?;
        }
        if let Ok(path) = env::var("DEDUPE_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(header) = env::var("DEDUPE_SCORE_HEADER") {
            config.score_header = header;
        }
        config.source_filter = SourceFilterConfig::from_env();

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("Worker count must be at least 1");
        }
        if self.id_column == 0 || self.source_column == 0 {
            bail!("Column numbers are 1-based; 0 is not a valid column");
        }
        let uen_columns = self
            .columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Uen)
            .count();
        if uen_columns != 1 {
            bail!("Column layout needs exactly one uen column, found {}", uen_columns);
        }
        let mut seen = HashSet::new();
        for spec in &self.columns {
            if !seen.insert(spec.column_no) {
                bail!("Column {} is listed more than once", spec.column_no);
            }
            if spec.column_no == self.id_column {
                bail!("Column {} is the id column and cannot be compared", spec.column_no);
            }
            spec.weights
                .validate()
                .with_context(|| format!("Invalid weights for column {}", spec.column_no))?;
        }
        Ok(())
    }

    pub fn log_config(&self) {
        info!("🔧 Scoring configuration:");
        info!("   • {} workers", self.workers);
        info!("   • id column {}, source column {}", self.id_column, self.source_column);
        for spec in &self.columns {
            info!(
                "   • {} column {} (weight {}, exact match weight {})",
                spec.kind, spec.column_no, spec.weights.weight, spec.weights.exact_match_weight
            );
        }
        info!("   • output {}", self.output_path.display());
        self.source_filter.log_config();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::PassWeights;

    #[test]
    fn test_default_layout() {
        let config = DedupeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.workers >= 1);
        assert_eq!(config.columns.len(), 4);
        assert_eq!(config.columns[0], ColumnSpec::uen(3));
        assert_eq!(config.columns[3], ColumnSpec::text(6, PassWeights::new(0.5)));
        assert_eq!(config.score_header, "Similarity Score");
    }

    #[test]
    fn test_validate_rejects_bad_layouts() {
        let mut config = DedupeConfig::default();
        config.columns = vec![ColumnSpec::text(4, PassWeights::default())];
        assert!(config.validate().is_err());

        let mut config = DedupeConfig::default();
        config.columns.push(ColumnSpec::text(4, PassWeights::default()));
        assert!(config.validate().is_err());

        let mut config = DedupeConfig::default();
        config.columns.push(ColumnSpec::text(1, PassWeights::default()));
        assert!(config.validate().is_err());

        let mut config = DedupeConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());
    }
}
