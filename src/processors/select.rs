// src/processors/select.rs
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::Table;
use indexmap::IndexMap;

/// Project the table onto the requested source columns and rename them.
/// Output order follows `column_map`. Requested names that do not exist are
/// reported; only an empty intersection fails. When several sources map to
/// the same target, the first one present wins and the rest are reported.
pub fn select_and_rename(
    table: &Table,
    column_map: &IndexMap<String, String>,
) -> Result<StageOutput<Table>, CleaningError> {
    let mut selected = Table::new();
    let mut not_found: Vec<&str> = Vec::new();
    let mut collisions: Vec<String> = Vec::new();

    for (source, target) in column_map {
        match table.column(source) {
            Some(_) if selected.contains(target) => {
                collisions.push(format!("{} -> {}", source, target));
            }
            Some(series) => selected.insert_column(target.clone(), series.clone())?,
            None => not_found.push(source),
        }
    }

    if selected.column_count() == 0 {
        return Err(CleaningError::NoColumnsSelected);
    }

    let mut report = StageReport::new(
        Stage::Select,
        format!("{} columns selected and renamed", selected.column_count()),
    )
    .rows(selected.row_count())
    .columns(selected.column_names());

    if !not_found.is_empty() {
        not_found.sort_unstable();
        report.warn(format!(
            "These columns were not found and skipped: {}",
            not_found.join(", ")
        ));
    }
    if !collisions.is_empty() {
        report.warn(format!(
            "These columns map to an already selected name and were skipped: {}",
            collisions.join(", ")
        ));
    }

    Ok(StageOutput::new(selected, report))
}

pub struct SelectColumns {
    column_map: IndexMap<String, String>,
}

impl SelectColumns {
    pub fn new(column_map: IndexMap<String, String>) -> Self {
        SelectColumns { column_map }
    }
}

impl TableStage for SelectColumns {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        select_and_rename(table, &self.column_map)
    }

    fn stage(&self) -> Stage {
        Stage::Select
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn raw_table() -> Table {
        Table::from_columns(vec![
            ("hhid", vec![Value::Int(10), Value::Int(11)]),
            ("s1aq4y", vec![Value::Int(30), Value::Int(12)]),
            ("region", vec![Value::Int(3), Value::Int(99)]),
            ("unused", vec![Value::text("x"), Value::text("y")]),
        ])
        .unwrap()
    }

    fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_selects_and_renames_in_map_order() {
        let column_map = map(&[
            ("region", "region"),
            ("s1aq4y", "age"),
            ("missing_col", "nope"),
            ("hhid", "household_id"),
        ]);
        let result = select_and_rename(&raw_table(), &column_map).unwrap();

        let names: Vec<&str> = result.output.column_names().collect();
        assert_eq!(names, vec!["region", "age", "household_id"]);
        assert_eq!(result.output.row_count(), 2);
        assert_eq!(
            result.output.column("age").unwrap().values(),
            &[Value::Int(30), Value::Int(12)]
        );
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("missing_col"));
    }

    #[test]
    fn test_output_columns_are_mapped_names_of_existing_sources() {
        let column_map = map(&[("hhid", "household_id"), ("ghost", "spirit")]);
        let table = raw_table();
        let result = select_and_rename(&table, &column_map).unwrap();

        for name in result.output.column_names() {
            assert!(column_map
                .iter()
                .any(|(src, dst)| dst == name && table.contains(src)));
        }
        assert!(!result.output.contains("spirit"));
    }

    #[test]
    fn test_identity_selection_is_idempotent() {
        let column_map = map(&[("region", "region"), ("hhid", "hhid")]);
        let once = select_and_rename(&raw_table(), &column_map).unwrap().output;
        let twice = select_and_rename(&once, &column_map).unwrap().output;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_colliding_targets_keep_first_and_warn() {
        let column_map = map(&[("hhid", "id"), ("s1aq4y", "id"), ("region", "region")]);
        let result = select_and_rename(&raw_table(), &column_map).unwrap();

        let names: Vec<&str> = result.output.column_names().collect();
        assert_eq!(names, vec!["id", "region"]);
        assert_eq!(
            result.output.column("id").unwrap().values(),
            &[Value::Int(10), Value::Int(11)]
        );
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("s1aq4y -> id"));
    }

    #[test]
    fn test_empty_intersection_fails() {
        let column_map = map(&[("a", "b")]);
        assert!(matches!(
            select_and_rename(&raw_table(), &column_map),
            Err(CleaningError::NoColumnsSelected)
        ));
    }
}
