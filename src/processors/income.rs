// src/processors/income.rs
use crate::config::SurveyConfig;
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::pipeline::stream::TableStage;
use crate::table::{Series, Table, Value};

/// Flag column marking rows that reported income before imputation
pub const HAS_INCOME_FLAG: &str = "has_primary_income";

/// Columns and labels the work-status-conditioned income imputation uses
#[derive(Debug, Clone)]
pub struct IncomeRule {
    pub work_status_column: String,
    pub income_column: String,
    pub worked_label: String,
    pub not_worked_label: String,
}

impl IncomeRule {
    pub fn from_config(config: &SurveyConfig) -> Self {
        IncomeRule {
            work_status_column: config.work_status.column.clone(),
            income_column: config.income_column.clone(),
            worked_label: config.work_status.worked_label.clone(),
            not_worked_label: config.work_status.not_worked_label.clone(),
        }
    }
}

/// Fill missing income using work status.
///
/// Non-workers get 0. Workers get the median income of workers who reported
/// one, falling back to the median of all present incomes, then to 0. Any
/// income still missing afterwards (unknown status) is set to 0, so the
/// income column is complete on return.
pub fn impute_income(
    table: &Table,
    rule: &IncomeRule,
) -> Result<StageOutput<Table>, CleaningError> {
    let income = required_column(table, &rule.income_column)?;
    let status = required_column(table, &rule.work_status_column)?;
    if !income.is_numeric() {
        return Err(CleaningError::NonNumericColumn {
            stage: Stage::Income,
            column: rule.income_column.clone(),
        });
    }

    let has_income = income.map(|v| Value::Int(if v.is_missing() { 0 } else { 1 }));

    let is_label =
        |index: usize, label: &str| status.get(index).and_then(Value::as_text) == Some(label);
    let zero = income.numeric_literal(0.0);
    let mut values: Vec<Value> = income.values().to_vec();
    let mut report = StageReport::new(Stage::Income, String::new())
        .columns([rule.income_column.as_str(), HAS_INCOME_FLAG]);

    let mut zeroed = 0;
    for (index, value) in values.iter_mut().enumerate() {
        if value.is_missing() && is_label(index, rule.not_worked_label.as_str()) {
            *value = zero.clone();
            zeroed += 1;
        }
    }
    report.note(format!(
        "Imputed 0 for {} individuals who did not work and had missing income",
        zeroed
    ));

    let worker_incomes = Series::new(
        values
            .iter()
            .enumerate()
            .filter(|(index, value)| {
                !value.is_missing() && is_label(*index, rule.worked_label.as_str())
            })
            .map(|(_, value)| value.clone())
            .collect(),
    );
    let median = match worker_incomes.median() {
        Some(median) => median,
        None => {
            report.warn(
                "Could not calculate median income for workers; using overall median or 0",
            );
            Series::new(values.clone()).median().unwrap_or(0.0)
        }
    };

    let fill = income.numeric_literal(median);
    let mut worker_filled = 0;
    for (index, value) in values.iter_mut().enumerate() {
        if value.is_missing() && is_label(index, rule.worked_label.as_str()) {
            *value = fill.clone();
            worker_filled += 1;
        }
    }
    report.note(format!(
        "Imputed median ({:.2}) for {} individuals who worked but had missing income",
        median, worker_filled
    ));

    let mut leftover = 0;
    for value in values.iter_mut().filter(|v| v.is_missing()) {
        *value = zero.clone();
        leftover += 1;
    }
    if leftover > 0 {
        report.warn(format!(
            "{} missing values remained in '{}' (unknown work status); filled with 0",
            leftover, rule.income_column
        ));
    }

    report.message = format!(
        "Imputation for '{}' completed using worker median {:.2}",
        rule.income_column, median
    );
    report.rows_affected = zeroed + worker_filled + leftover;

    let mut output = table.clone();
    output.insert_column(HAS_INCOME_FLAG, has_income)?;
    output.insert_column(rule.income_column.clone(), Series::new(values))?;
    Ok(StageOutput::new(output, report))
}

fn required_column<'a>(table: &'a Table, name: &str) -> Result<&'a Series, CleaningError> {
    table.column(name).ok_or_else(|| CleaningError::ColumnNotFound {
        stage: Stage::Income,
        column: name.to_string(),
    })
}

pub struct ImputeIncome {
    rule: IncomeRule,
}

impl ImputeIncome {
    pub fn new(rule: IncomeRule) -> Self {
        ImputeIncome { rule }
    }
}

impl TableStage for ImputeIncome {
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError> {
        impute_income(table, &self.rule)
    }

    fn stage(&self) -> Stage {
        Stage::Income
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> IncomeRule {
        IncomeRule::from_config(&SurveyConfig::default())
    }

    fn table(status: Vec<Value>, income: Vec<Value>) -> Table {
        Table::from_columns(vec![
            ("worked_last_7_days", status),
            ("primary_job_income_monthly", income),
        ])
        .unwrap()
    }

    fn income_of(table: &Table) -> Vec<Value> {
        table
            .column("primary_job_income_monthly")
            .unwrap()
            .values()
            .to_vec()
    }

    #[test]
    fn test_workers_get_median_and_non_workers_zero() {
        let input = table(
            vec![Value::text("Yes"), Value::text("Yes"), Value::text("No"), Value::text("Yes")],
            vec![Value::Int(1000), Value::Missing, Value::Missing, Value::Int(500)],
        );
        let result = impute_income(&input, &rule()).unwrap();

        assert_eq!(
            income_of(&result.output),
            vec![Value::Int(1000), Value::Int(750), Value::Int(0), Value::Int(500)]
        );
        assert_eq!(
            result.output.column(HAS_INCOME_FLAG).unwrap().values(),
            &[Value::Int(1), Value::Int(0), Value::Int(0), Value::Int(1)]
        );
        assert_eq!(result.report.rows_affected, 2);
        assert!(result.report.is_ok());
    }

    #[test]
    fn test_fractional_median_kept_as_float() {
        let input = table(
            vec![Value::text("Yes"), Value::text("Yes"), Value::text("Yes")],
            vec![Value::Int(100), Value::Int(201), Value::Missing],
        );
        let result = impute_income(&input, &rule()).unwrap();
        assert_eq!(income_of(&result.output)[2], Value::Float(150.5));
    }

    #[test]
    fn test_falls_back_to_overall_median_without_reporting_workers() {
        let input = table(
            vec![Value::text("No"), Value::text("Yes"), Value::Missing],
            vec![Value::Int(300), Value::Missing, Value::Int(100)],
        );
        let result = impute_income(&input, &rule()).unwrap();

        assert_eq!(income_of(&result.output)[1], Value::Int(200));
        assert!(!result.report.is_ok());
    }

    #[test]
    fn test_all_missing_falls_back_to_zero_and_leaves_nothing_missing() {
        let input = table(
            vec![Value::text("Yes"), Value::Missing, Value::text("maybe")],
            vec![Value::Missing, Value::Missing, Value::Missing],
        );
        let result = impute_income(&input, &rule()).unwrap();

        let income = income_of(&result.output);
        assert!(income.iter().all(|v| !v.is_missing()));
        assert!(income.iter().all(|v| *v == Value::Int(0)));
        assert_eq!(result.report.warnings.len(), 2);
    }

    #[test]
    fn test_missing_columns_fail() {
        let input =
            Table::from_columns(vec![("worked_last_7_days", vec![Value::text("Yes")])]).unwrap();
        assert!(matches!(
            impute_income(&input, &rule()),
            Err(CleaningError::ColumnNotFound { stage: Stage::Income, .. })
        ));
    }

    #[test]
    fn test_text_income_is_rejected() {
        let input = table(vec![Value::text("Yes")], vec![Value::text("lots")]);
        assert!(matches!(
            impute_income(&input, &rule()),
            Err(CleaningError::NonNumericColumn { .. })
        ));
    }
}
