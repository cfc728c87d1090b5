use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::Table;

/// Remove the named columns that exist; unknown names are only reported.
pub fn drop_columns(
    table: &Table,
    columns: &[String],
) -> Result<StageOutput<Table>, CleaningError> {
    let (found, not_found): (Vec<&String>, Vec<&String>) =
        columns.iter().partition(|name| table.contains(name));

    if found.is_empty() {
        let mut report =
            StageReport::new(Stage::Drop, "No columns to drop were found in the table");
        if !not_found.is_empty() {
            report.note(format!("Columns to drop not found: {}", join(&not_found)));
        }
        return Ok(StageOutput::new(table.clone(), report));
    }

    let mut dropped = table.clone();
    for name in &found {
        dropped.remove_column(name);
    }

    let mut report = StageReport::new(
        Stage::Drop,
        format!("Dropped {} columns: {}", found.len(), join(&found)),
    )
    .rows(dropped.row_count())
    .columns(found.iter().map(|s| s.as_str()));
    if !not_found.is_empty() {
        report.note(format!("Columns to drop not found: {}", join(&not_found)));
    }

    Ok(StageOutput::new(dropped, report))
}

fn join(names: &[&String]) -> String {
    names
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DropColumns {
    columns: Vec<String>,
}

impl DropColumns {
    pub fn new(columns: Vec<String>) -> Self {
        DropColumns { columns }
    }
}

impl TableStage for DropColumns {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        drop_columns(table, &self.columns)
    }

    fn stage(&self) -> Stage {
        Stage::Drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table() -> Table {
        Table::from_columns(vec![
            ("a", vec![Value::Int(1)]),
            ("b", vec![Value::Int(2)]),
            ("c", vec![Value::Int(3)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_drops_present_columns_and_notes_missing() {
        let names = vec!["b".to_string(), "zzz".to_string()];
        let result = drop_columns(&table(), &names).unwrap();

        let remaining: Vec<&str> = result.output.column_names().collect();
        assert_eq!(remaining, vec!["a", "c"]);
        assert_eq!(result.report.columns_affected, vec!["b"]);
        assert!(result.report.notes[0].contains("zzz"));
        assert!(result.report.is_ok());
    }

    #[test]
    fn test_no_matching_names_is_a_no_op() {
        let names = vec!["x".to_string()];
        let original = table();
        let result = drop_columns(&original, &names).unwrap();
        assert_eq!(result.output, original);
    }
}
