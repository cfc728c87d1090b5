// src/processors/missing.rs - Read-only missing value diagnostics
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::table::Table;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub name: String,
    pub missing: usize,
    pub percent: f64,
}

/// Columns with at least one missing value, most-missing first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingSummary {
    pub total_rows: usize,
    pub columns_checked: usize,
    pub columns: Vec<ColumnMissing>,
}

impl MissingSummary {
    pub fn is_clean(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnMissing> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub fn missing_values_summary(table: &Table) -> Result<StageOutput<MissingSummary>, CleaningError> {
    if table.is_empty() {
        return Err(CleaningError::EmptyTable(Stage::MissingReport));
    }

    let total_rows = table.row_count();
    let mut columns: Vec<ColumnMissing> = table
        .columns()
        .map(|(name, series)| {
            let missing = series.missing_count();
            ColumnMissing {
                name: name.to_string(),
                missing,
                percent: missing as f64 / total_rows as f64 * 100.0,
            }
        })
        .filter(|c| c.missing > 0)
        .collect();
    // stable, so ties keep table order
    columns.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    let message = if columns.is_empty() {
        "No missing values found in any columns".to_string()
    } else {
        format!(
            "{} of {} columns have missing values",
            columns.len(),
            table.column_count()
        )
    };
    let report = StageReport::new(Stage::MissingReport, message)
        .rows(total_rows)
        .columns(columns.iter().map(|c| c.name.clone()));

    let summary = MissingSummary {
        total_rows,
        columns_checked: table.column_count(),
        columns,
    };
    Ok(StageOutput::new(summary, report))
}

impl fmt::Display for MissingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            writeln!(f, "No missing values found in any columns.")?;
        } else {
            let width = self
                .columns
                .iter()
                .map(|c| c.name.len())
                .chain(std::iter::once("Column Name".len()))
                .max()
                .unwrap_or(0);
            writeln!(
                f,
                "{:<width$}  {:>14}  {:>22}  {:>10}",
                "Column Name", "Missing Values", "Percentage Missing (%)", "Total Rows"
            )?;
            for column in &self.columns {
                writeln!(
                    f,
                    "{:<width$}  {:>14}  {:>22.2}  {:>10}",
                    column.name, column.missing, column.percent, self.total_rows
                )?;
            }
        }
        writeln!(f)?;
        write!(f, "Total rows in table: {}", self.total_rows)
    }
}
