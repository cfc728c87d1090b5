use crate::config::CategoryMap;
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::{Table, Value};

pub fn mapped_column_name(column: &str) -> String {
    format!("{}_mapped", column)
}

/// Add `<column>_mapped` holding the label for each code. The source column
/// is left untouched; codes missing from `mapping` decode to missing and are
/// counted as unmapped.
pub fn decode_categorical(
    table: &Table,
    column: &str,
    mapping: &CategoryMap,
) -> Result<StageOutput<Table>, CleaningError> {
    let source = table.column(column).ok_or_else(|| CleaningError::ColumnNotFound {
        stage: Stage::Decode,
        column: column.to_string(),
    })?;

    let decoded = source.map(|value| {
        code_of(value)
            .and_then(|code| mapping.get(&code))
            .map(|label| Value::text(label.as_str()))
            .unwrap_or(Value::Missing)
    });

    let unmapped = source
        .values()
        .iter()
        .zip(decoded.values())
        .filter(|(code, label)| !code.is_missing() && label.is_missing())
        .count();
    let mapped = decoded.len() - decoded.missing_count();

    let target = mapped_column_name(column);
    let mut report = StageReport::new(
        Stage::Decode,
        format!("Column '{}' mapped to '{}'", column, target),
    )
    .rows(mapped)
    .columns([target.as_str()]);
    if unmapped > 0 {
        report.warn(format!(
            "Found {} values in '{}' not present in the provided map",
            unmapped, column
        ));
    }

    let mut output = table.clone();
    output.insert_column(target, decoded)?;
    Ok(StageOutput::new(output, report))
}

/// Integer code of a cell; text holding an integer also counts.
fn code_of(value: &Value) -> Option<i64> {
    value
        .as_code()
        .or_else(|| value.as_text().and_then(|s| s.trim().parse().ok()))
}

pub struct DecodeCategorical {
    column: String,
    mapping: CategoryMap,
}

impl DecodeCategorical {
    pub fn new(column: impl Into<String>, mapping: CategoryMap) -> Self {
        DecodeCategorical {
            column: column.into(),
            mapping,
        }
    }
}

impl TableStage for DecodeCategorical {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        decode_categorical(table, &self.column, &self.mapping)
    }

    fn stage(&self) -> Stage {
        Stage::Decode
    }

    fn name(&self) -> &str {
        &self.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurveyConfig;

    #[test]
    fn test_unmapped_code_decodes_to_missing() {
        let config = SurveyConfig::default();
        let input = Table::from_columns(vec![(
            "region",
            vec![Value::Int(3), Value::Int(99), Value::Missing, Value::Float(6.0)],
        )])
        .unwrap();

        let result = decode_categorical(&input, "region", &config.category_maps["region"]).unwrap();
        let out = &result.output;

        assert_eq!(out.row_count(), 4);
        assert_eq!(out.column("region").unwrap(), input.column("region").unwrap());
        assert_eq!(
            out.column("region_mapped").unwrap().values(),
            &[
                Value::text("Greater Accra"),
                Value::Missing,
                Value::Missing,
                Value::text("Ashanti")
            ]
        );
        assert_eq!(result.report.rows_affected, 2);
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].starts_with("Found 1 values"));
    }

    #[test]
    fn test_text_codes_decode() {
        let mapping: CategoryMap = [(1, "Male".to_string()), (2, "Female".to_string())]
            .into_iter()
            .collect();
        let input =
            Table::from_columns(vec![("sex", vec![Value::text("2"), Value::text("x")])]).unwrap();
        let result = decode_categorical(&input, "sex", &mapping).unwrap();
        assert_eq!(
            result.output.column("sex_mapped").unwrap().values(),
            &[Value::text("Female"), Value::Missing]
        );
    }

    #[test]
    fn test_absent_source_fails() {
        let input = Table::from_columns(vec![("sex", vec![Value::Int(1)])]).unwrap();
        assert!(matches!(
            decode_categorical(&input, "region", &CategoryMap::new()),
            Err(CleaningError::ColumnNotFound { stage: Stage::Decode, .. })
        ));
    }
}
