// src/processors/age.rs
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::Table;

pub const DEFAULT_AGE_COLUMN: &str = "age";

/// Keep rows whose age is at least `min_age`.
///
/// A non-numeric age column is coerced first; entries that do not parse
/// become missing and are excluded along with already-missing ages. With
/// `report_unparseable` those exclusions are counted separately from rows
/// below the threshold.
pub fn filter_by_age(
    table: &Table,
    min_age: f64,
    age_column: &str,
    report_unparseable: bool,
) -> Result<StageOutput<Table>, CleaningError> {
    let series = table
        .column(age_column)
        .ok_or_else(|| CleaningError::ColumnNotFound {
            stage: Stage::AgeFilter,
            column: age_column.to_string(),
        })?;

    let mut warnings = Vec::new();
    let mut working = table.clone();
    if !series.is_numeric() {
        let coerced = series.to_numeric();
        let failed = coerced.missing_count() - series.missing_count();
        warnings.push(format!(
            "Age column '{}' is not numeric; converted, {} values could not be parsed \
             and are now missing",
            age_column, failed
        ));
        working.insert_column(age_column, coerced)?;
    }

    let ages = working
        .column(age_column)
        .ok_or_else(|| CleaningError::ColumnNotFound {
            stage: Stage::AgeFilter,
            column: age_column.to_string(),
        })?;

    let mut keep = Vec::with_capacity(ages.len());
    let mut unparseable = 0;
    for (index, value) in ages.values().iter().enumerate() {
        match value.as_f64() {
            Some(age) if age >= min_age => keep.push(index),
            Some(_) => {}
            None => unparseable += 1,
        }
    }

    let original_rows = table.row_count();
    let filtered = working.take_rows(&keep);
    let removed = original_rows - filtered.row_count();

    let mut message = format!(
        "Filtered by age: {} rows remaining (>= {} years). {} rows removed",
        filtered.row_count(),
        min_age,
        removed
    );
    if report_unparseable {
        message.push_str(&format!(
            " ({} below minimum, {} with missing or unparseable age)",
            removed - unparseable,
            unparseable
        ));
    }

    let mut report = StageReport::new(Stage::AgeFilter, message)
        .rows(removed)
        .columns([age_column]);
    for warning in warnings {
        report.warn(warning);
    }

    Ok(StageOutput::new(filtered, report))
}

pub struct AgeFilter {
    min_age: f64,
    column: String,
    report_unparseable: bool,
}

impl AgeFilter {
    pub fn new(min_age: f64) -> Self {
        AgeFilter {
            min_age,
            column: DEFAULT_AGE_COLUMN.to_string(),
            report_unparseable: true,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn report_unparseable(mut self, enabled: bool) -> Self {
        self.report_unparseable = enabled;
        self
    }
}

impl TableStage for AgeFilter {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        filter_by_age(table, self.min_age, &self.column, self.report_unparseable)
    }

    fn stage(&self) -> Stage {
        Stage::AgeFilter
    }
}
