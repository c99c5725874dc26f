// src/models/core.rs
use anyhow::{bail, Context, Result};
use std::fmt;

use crate::matching::uen::UenColumn;
use crate::utils::constants::{DEFAULT_TEXT_EXACT_MATCH_WEIGHT, DEFAULT_TEXT_WEIGHT};

/// Weighting parameters for one comparison pass.
///
/// `weight` scales partial-match evidence, `exact_match_weight` scales the
/// bonus for identical values. Both must be finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassWeights {
    pub weight: f64,
    pub exact_match_weight: f64,
}

impl PassWeights {
    /// Exact-match weight defaults to the partial-match weight.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            exact_match_weight: weight,
        }
    }

    pub fn with_exact_match(mut self, exact_match_weight: f64) -> Self {
        self.exact_match_weight = exact_match_weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("weight", self.weight), ("exact match weight", self.exact_match_weight)] {
            if !value.is_finite() || value < 0.0 {
                bail!("Invalid {}: {} (must be a finite value >= 0)", name, value);
            }
        }
        Ok(())
    }
}

impl Default for PassWeights {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_WEIGHT).with_exact_match(DEFAULT_TEXT_EXACT_MATCH_WEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Registration code, compared raw and normalized.
    Uen,
    /// Free text, compared with edit similarity.
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Uen => write!(f, "uen"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

/// One compared column of the input table. Column numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub column_no: usize,
    pub weights: PassWeights,
}

impl ColumnSpec {
    pub fn uen(column_no: usize) -> Self {
        Self {
            kind: ColumnKind::Uen,
            column_no,
            weights: PassWeights::default(),
        }
    }

    pub fn text(column_no: usize, weights: PassWeights) -> Self {
        Self {
            kind: ColumnKind::Text,
            column_no,
            weights,
        }
    }

    /// Parses `kind:column[:weight[:exact]]`, e.g. `text:6:0.5:0.5`.
    /// A missing exact-match weight falls back to 1.5 when no weight is
    /// given, and to the weight itself otherwise.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(':').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 {
            bail!("Invalid column spec {:?}: expected kind:column[:weight[:exact]]", raw);
        }

        let column_no: usize = parts[1]
            .parse()
            .with_context(|| format!("Invalid column number in spec {:?}", raw))?;
        if column_no == 0 {
            bail!("Column numbers are 1-based, got 0 in spec {:?}", raw);
        }

        match parts[0].to_lowercase().as_str() {
            "uen" => {
                if parts.len() > 2 {
                    bail!("UEN column spec {:?} does not take weights", raw);
                }
                Ok(Self::uen(column_no))
            }
            "text" => {
                let weights = match parts.get(2) {
                    None => PassWeights::default(),
                    Some(w) => {
                        let weight: f64 = w
                            .parse()
                            .with_context(|| format!("Invalid weight in spec {:?}", raw))?;
                        let exact = match parts.get(3) {
                            Some(e) => e
                                .parse()
                                .with_context(|| format!("Invalid exact match weight in spec {:?}", raw))?,
                            None => weight,
                        };
                        PassWeights::new(weight).with_exact_match(exact)
                    }
                };
                weights
                    .validate()
                    .with_context(|| format!("Invalid weights in spec {:?}", raw))?;
                Ok(Self::text(column_no, weights))
            }
            other => bail!("Unknown column kind {:?} in spec {:?}", other, raw),
        }
    }
}

pub fn parse_column_specs(raw: &str) -> Result<Vec<ColumnSpec>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(ColumnSpec::parse)
        .collect()
}

/// One scoring pass over an attribute column.
#[derive(Debug, Clone)]
pub enum ColumnPass {
    Text {
        label: String,
        values: Vec<String>,
        weights: PassWeights,
    },
    Uen { label: String, column: UenColumn },
}

impl ColumnPass {
    pub fn label(&self) -> &str {
        match self {
            ColumnPass::Text { label, .. } | ColumnPass::Uen { label, .. } => label,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnPass::Text { values, .. } => values.len(),
            ColumnPass::Uen { column, .. } => column.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the scorers read. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ids: Vec<String>,
    pub sources: Option<Vec<String>>,
    pub passes: Vec<ColumnPass>,
}

impl Dataset {
    pub fn new(ids: Vec<String>, sources: Option<Vec<String>>, passes: Vec<ColumnPass>) -> Result<Self> {
        let n = ids.len();
        if let Some(sources) = &sources {
            if sources.len() != n {
                bail!("Source column has {} values but there are {} rows", sources.len(), n);
            }
        }
        for pass in &passes {
            if pass.len() != n {
                bail!(
                    "Column {:?} has {} values but there are {} rows",
                    pass.label(),
                    pass.len(),
                    n
                );
            }
            if let ColumnPass::Text { weights, label, .. } = pass {
                weights
                    .validate()
                    .with_context(|| format!("Invalid weights for column {:?}", label))?;
            }
        }
        let uen_passes = passes
            .iter()
            .filter(|p| matches!(p, ColumnPass::Uen { .. }))
            .count();
        if uen_passes != 1 {
            bail!("Expected exactly one registration code column, found {}", uen_passes);
        }
        Ok(Self { ids, sources, passes })
    }

    pub fn row_count(&self) -> usize {
        self.ids.len()
    }
}
