// src/processors/impute.rs
use crate::config::Strategy;
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::{Table, Value};
use indexmap::IndexMap;
use tracing::debug;

/// Fill missing values column by column according to `strategies`.
///
/// Absent columns and columns without missing values are noted and skipped.
/// A median on a non-numeric column, or a statistic that cannot be computed,
/// skips that column with a warning; other columns are still imputed.
pub fn impute_missing(
    table: &Table,
    strategies: &IndexMap<String, Strategy>,
) -> Result<StageOutput<Table>, CleaningError> {
    if table.is_empty() {
        return Err(CleaningError::EmptyTable(Stage::Impute));
    }

    let mut output = table.clone();
    let mut report = StageReport::new(Stage::Impute, String::new());
    let mut imputed_columns = Vec::new();
    let mut rows_filled = 0;

    for (column, strategy) in strategies {
        let Some(series) = output.column(column) else {
            report.note(format!("Column '{}' not found for imputation, skipping", column));
            continue;
        };
        if !series.has_missing() {
            report.note(format!("No missing values found in '{}'", column));
            continue;
        }

        let fill = match strategy {
            Strategy::Median => {
                if !series.is_numeric() {
                    report.warn(format!(
                        "Median requested for non-numeric column '{}' ({}), skipping",
                        column,
                        series.dtype()
                    ));
                    continue;
                }
                match series.median() {
                    Some(median) => series.numeric_literal(median),
                    None => {
                        report.warn(format!("No median computable for '{}', skipping", column));
                        continue;
                    }
                }
            }
            Strategy::MostFrequent => match series.mode() {
                Some(mode) => mode,
                None => {
                    report.warn(format!("No mode computable for '{}', skipping", column));
                    continue;
                }
            },
            Strategy::Literal(value) => value.clone(),
        };

        let (filled, count) = series.fill_missing(&fill);
        debug!(column = %column, count, value = %describe(&fill), "imputed");
        report.note(format!(
            "Missing '{}' values imputed with {} ({})",
            column,
            strategy,
            describe(&fill)
        ));
        output.insert_column(column.clone(), filled)?;
        imputed_columns.push(column.clone());
        rows_filled += count;
    }

    report.message = format!(
        "Imputation finished. {} columns processed",
        imputed_columns.len()
    );
    report.rows_affected = rows_filled;
    report.columns_affected = imputed_columns;
    Ok(StageOutput::new(output, report))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Float(f) => format!("{:.2}", f),
        other => other.to_string(),
    }
}

pub struct ImputeMissing {
    strategies: IndexMap<String, Strategy>,
}

impl ImputeMissing {
    pub fn new(strategies: IndexMap<String, Strategy>) -> Self {
        ImputeMissing { strategies }
    }
}

impl TableStage for ImputeMissing {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        impute_missing(table, &self.strategies)
    }

    fn stage(&self) -> Stage {
        Stage::Impute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            (
                "grade",
                vec![Value::Int(3), Value::Missing, Value::Int(8), Value::Int(5)],
            ),
            (
                "marital",
                vec![Value::Int(2), Value::Int(1), Value::Missing, Value::Int(2)],
            ),
            (
                "expense",
                vec![Value::Missing, Value::Float(10.5), Value::Missing, Value::Int(4)],
            ),
            (
                "notes",
                vec![Value::text("a"), Value::Missing, Value::text("b"), Value::text("a")],
            ),
            ("empty", vec![Value::Missing; 4]),
            ("complete", vec![Value::Int(1); 4]),
        ])
        .unwrap()
    }

    fn strategies(pairs: Vec<(&str, Strategy)>) -> IndexMap<String, Strategy> {
        pairs.into_iter().map(|(c, s)| (c.to_string(), s)).collect()
    }

    #[test]
    fn test_each_strategy_fills_its_column() {
        let plan = strategies(vec![
            ("grade", Strategy::Median),
            ("marital", Strategy::MostFrequent),
            ("expense", Strategy::Literal(Value::Int(0))),
            ("notes", Strategy::MostFrequent),
        ]);
        let result = impute_missing(&table(), &plan).unwrap();
        let out = &result.output;

        assert_eq!(out.column("grade").unwrap().get(1), Some(&Value::Int(5)));
        assert_eq!(out.column("marital").unwrap().get(2), Some(&Value::Int(2)));
        assert_eq!(out.column("expense").unwrap().get(0), Some(&Value::Int(0)));
        assert_eq!(out.column("notes").unwrap().get(1), Some(&Value::text("a")));
        for column in plan.keys() {
            assert_eq!(out.column(column).unwrap().missing_count(), 0, "{}", column);
        }
        assert_eq!(result.report.columns_affected.len(), 4);
        assert_eq!(result.report.rows_affected, 5);
        assert!(result.report.is_ok());
    }

    #[test]
    fn test_skips_uncomputable_and_non_numeric_without_undoing_others() {
        let plan = strategies(vec![
            ("grade", Strategy::Median),
            ("notes", Strategy::Median),
            ("empty", Strategy::MostFrequent),
            ("ghost", Strategy::Median),
            ("complete", Strategy::Median),
        ]);
        let result = impute_missing(&table(), &plan).unwrap();

        assert_eq!(result.output.column("grade").unwrap().missing_count(), 0);
        assert_eq!(result.output.column("notes").unwrap().missing_count(), 1);
        assert_eq!(result.output.column("empty").unwrap().missing_count(), 4);
        assert_eq!(result.report.columns_affected, vec!["grade"]);
        assert_eq!(result.report.warnings.len(), 2);
        assert_eq!(result.report.notes.len(), 3);
    }

    #[test]
    fn test_literal_applied_regardless_of_type() {
        let plan = strategies(vec![("grade", Strategy::Literal(Value::text("unknown")))]);
        let result = impute_missing(&table(), &plan).unwrap();
        assert_eq!(
            result.output.column("grade").unwrap().get(1),
            Some(&Value::text("unknown"))
        );
    }

    #[test]
    fn test_empty_table_fails() {
        let plan = strategies(vec![("grade", Strategy::Median)]);
        assert!(matches!(
            impute_missing(&Table::new(), &plan),
            Err(CleaningError::EmptyTable(Stage::Impute))
        ));
    }
}
