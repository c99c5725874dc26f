// src/io/table.rs - CSV input/output for the scoring run
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use log::debug;
use std::path::Path;

/// A header row plus data rows, kept verbatim so the output can reproduce them.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl Table {
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header row of {}", path.display()))?
            .clone();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read rows of {}", path.display()))?;
        debug!("Read {} rows from {}", records.len(), path.display());
        Ok(Self { headers, records })
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Header of a 1-based column, or a generated label when the header row is short.
    pub fn header(&self, column_no: usize) -> String {
        column_no
            .checked_sub(1)
            .and_then(|idx| self.headers.get(idx))
            .map(str::to_string)
            .unwrap_or_else(|| format!("column {}", column_no))
    }

    /// Cells of a 1-based column, uppercased. Missing cells read as "".
    pub fn column(&self, column_no: usize) -> Result<Vec<String>> {
        if column_no == 0 {
            bail!("Column numbers are 1-based");
        }
        let idx = column_no - 1;
        if idx >= self.headers.len() && self.records.iter().all(|r| idx >= r.len()) {
            bail!(
                "Column {} does not exist (table has {} columns)",
                column_no,
                self.headers.len()
            );
        }
        Ok(self
            .records
            .iter()
            .map(|record| record.get(idx).unwrap_or("").to_uppercase())
            .collect())
    }

    /// Writes the table unchanged with one extra column holding `scores`.
    pub fn write_csv_with_scores(&self, path: &Path, header: &str, scores: &[f64]) -> Result<()> {
        if scores.len() != self.records.len() {
            bail!(
                "Got {} scores for {} rows",
                scores.len(),
                self.records.len()
            );
        }
        let mut writer = Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let width = self
            .records
            .iter()
            .map(StringRecord::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut header_row: Vec<&str> = self.headers.iter().collect();
        header_row.resize(width, "");
        header_row.push(header);
        writer.write_record(&header_row)?;

        for (record, score) in self.records.iter().zip(scores) {
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            row.push(score.to_string());
            writer.write_record(&row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }
}
