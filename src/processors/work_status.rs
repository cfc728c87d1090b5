// src/processors/work_status.rs
use crate::config::{WorkStatusConfig, WorkStatusInput};
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::{Series, Table, Value};

/// Normalize the work-status column to the worked / not-worked labels.
///
/// Coded input is coerced to numbers, missing codes are filled with the most
/// frequent code, and codes are then mapped to labels. Labeled input has its
/// missing entries filled with the most frequent label. Values that end up
/// outside the two labels are reported, not rejected.
pub fn normalize_work_status(
    table: &Table,
    config: &WorkStatusConfig,
) -> Result<StageOutput<Table>, CleaningError> {
    let series = table
        .column(&config.column)
        .ok_or_else(|| CleaningError::ColumnNotFound {
            stage: Stage::WorkStatus,
            column: config.column.clone(),
        })?;

    let mut report =
        StageReport::new(Stage::WorkStatus, String::new()).columns([config.column.as_str()]);

    let normalized = match config.input {
        WorkStatusInput::Coded => {
            let numeric = series.to_numeric();
            let coerced = numeric.missing_count() - series.missing_count();
            if coerced > 0 {
                report.warn(format!(
                    "{} non-numeric entries in '{}' treated as missing",
                    coerced, config.column
                ));
            }
            let filled = fill_with_mode(&numeric, &config.column, &mut report);
            let labels = filled.map(|value| {
                value
                    .as_code()
                    .and_then(|code| config.codes.get(&code))
                    .map(|label| Value::text(label.as_str()))
                    .unwrap_or(Value::Missing)
            });
            report.message = format!(
                "Column '{}' mapped to '{}'/'{}'",
                config.column, config.worked_label, config.not_worked_label
            );
            labels
        }
        WorkStatusInput::Labeled => {
            let filled = fill_with_mode(series, &config.column, &mut report);
            report.message = format!("Column '{}' labels cleaned", config.column);
            filled
        }
    };

    let nonconformant = normalized
        .values()
        .iter()
        .filter(|value| {
            !matches!(value.as_text(), Some(label)
                if label == config.worked_label || label == config.not_worked_label)
        })
        .count();
    if nonconformant > 0 {
        report.warn(format!(
            "{} values in '{}' are neither '{}' nor '{}'",
            nonconformant, config.column, config.worked_label, config.not_worked_label
        ));
    }

    let mut output = table.clone();
    output.insert_column(config.column.clone(), normalized)?;
    Ok(StageOutput::new(output, report))
}

fn fill_with_mode(series: &Series, column: &str, report: &mut StageReport) -> Series {
    if !series.has_missing() {
        return series.clone();
    }
    match series.mode() {
        Some(mode) => {
            let (filled, count) = series.fill_missing(&mode);
            report.rows_affected = count;
            report.note(format!(
                "Imputed {} missing '{}' values with mode ({})",
                count, column, mode
            ));
            filled
        }
        None => {
            report.warn(format!(
                "Column '{}' has no present values; mode imputation skipped",
                column
            ));
            series.clone()
        }
    }
}

pub struct NormalizeWorkStatus {
    config: WorkStatusConfig,
}

impl NormalizeWorkStatus {
    pub fn new(config: WorkStatusConfig) -> Self {
        NormalizeWorkStatus { config }
    }
}

impl TableStage for NormalizeWorkStatus {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        normalize_work_status(table, &self.config)
    }

    fn stage(&self) -> Stage {
        Stage::WorkStatus
    }
}
