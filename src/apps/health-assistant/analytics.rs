// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// A CSV table. Column 0 is the axis (usually a date); the rest are metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Read the dataset at `path`. Nothing is cached; callers reload on every access.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let mut rdr = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(rdr) => rdr,
        Err(e) => {
            return Err(match e.kind() {
                csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound => {
                    AppError::DatasetNotFound(path.to_path_buf())
                }
                _ => AppError::InvalidDataset(format!("failed to open {}: {e}", path.display())),
            })
        }
    };

    let columns: Vec<String> = rdr
        .headers()
        .map_err(|e| AppError::InvalidDataset(format!("CSV header error: {e}")))?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| AppError::InvalidDataset(format!("CSV parse error: {e}")))?;
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    debug!("Loaded {} rows from {}", rows.len(), path.display());
    Dataset::new(columns, rows)
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        if columns.len() < 2 {
            return Err(AppError::InvalidDataset(
                "expected an index column and at least one metric column".to_string(),
            ));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index_column(&self) -> &str {
        &self.columns[0]
    }

    /// Selectable metrics: every column after the index.
    pub fn metric_columns(&self) -> &[String] {
        &self.columns[1..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn metric_position(&self, column: &str) -> Result<usize, AppError> {
        self.columns
            .iter()
            .skip(1)
            .position(|c| c == column)
            .map(|i| i + 1)
            .ok_or_else(|| AppError::Validation(format!("Unknown metric {column:?}")))
    }

    /// Numeric cells of `column`; blank or non-numeric cells count as missing.
    fn values(&self, column: &str) -> Result<Vec<f64>, AppError> {
        let idx = self.metric_position(column)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| parse_cell(&row[idx]))
            .collect())
    }

    /// Descriptive statistics over `column`.
    pub fn describe(&self, column: &str) -> Result<SummaryStats, AppError> {
        let values = self.values(column)?;
        Ok(SummaryStats::from_values(&values))
    }

    /// `(index, value)` pairs in file order; rows with a missing value are skipped.
    pub fn series_for(&self, column: &str) -> Result<Vec<(String, f64)>, AppError> {
        let idx = self.metric_position(column)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|row| parse_cell(&row[idx]).map(|v| (row[0].clone(), v)))
            .collect())
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// count / mean / std / min / quartiles / max of one column.
///
/// `std` is the sample standard deviation; quartiles interpolate linearly
/// between order statistics. Undefined values are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if count > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            f64::NAN
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}

/// Aligned two-column table, one statistic per line.
impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let cells: Vec<String> = rows.iter().map(|(_, v)| format_stat(*v)).collect();
        let width = cells.iter().map(String::len).max().unwrap_or(0);
        for (i, ((label, _), cell)) in rows.iter().zip(&cells).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{label:<5}    {cell:>width$}")?;
        }
        Ok(())
    }
}
