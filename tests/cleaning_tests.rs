// tests/cleaning_tests.rs - Stage behavior through the public API
use surveyclean::processors::{
    decode_categorical, filter_by_age, impute_income, impute_missing, normalize_work_status,
    IncomeRule, HAS_INCOME_FLAG,
};
use surveyclean::{Strategy, SurveyConfig, Table, Value};

fn worked(labels: &[&str]) -> Vec<Value> {
    labels.iter().map(|l| Value::text(*l)).collect()
}

#[test]
fn test_age_filter_excludes_young_missing_and_unparseable() {
    let table = Table::from_columns(vec![(
        "age",
        vec![Value::Int(14), Value::Int(25), Value::Missing, Value::text("abc")],
    )])
    .unwrap();

    let result = filter_by_age(&table, 15.0, "age", true).unwrap();

    assert_eq!(result.output.row_count(), 1);
    assert_eq!(result.output.column("age").unwrap().get(0), Some(&Value::Int(25)));
    // the caller's table is untouched
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.column("age").unwrap().get(3), Some(&Value::text("abc")));
}

#[test]
fn test_work_status_codes_then_income_imputation() {
    let config = SurveyConfig::default();
    let table = Table::from_columns(vec![
        (
            "worked_last_7_days",
            vec![Value::Int(1), Value::Int(2), Value::Missing, Value::Int(1)],
        ),
        (
            "primary_job_income_monthly",
            vec![Value::Int(1000), Value::Missing, Value::Missing, Value::Int(500)],
        ),
    ])
    .unwrap();

    let labeled = normalize_work_status(&table, &config.work_status).unwrap().output;
    assert_eq!(
        labeled.column("worked_last_7_days").unwrap().values(),
        worked(&["Yes", "No", "Yes", "Yes"]).as_slice()
    );

    let imputed = impute_income(&labeled, &IncomeRule::from_config(&config)).unwrap().output;
    let income = imputed.column("primary_job_income_monthly").unwrap();
    // row 2 did not work, row 3 was imputed as a worker: median(1000, 500)
    assert_eq!(
        income.values(),
        &[Value::Int(1000), Value::Int(0), Value::Int(750), Value::Int(500)]
    );
    assert_eq!(income.missing_count(), 0);
    assert_eq!(
        imputed.column(HAS_INCOME_FLAG).unwrap().values(),
        &[Value::Int(1), Value::Int(0), Value::Int(0), Value::Int(1)]
    );
}

#[test]
fn test_income_imputation_matches_worker_median() {
    let config = SurveyConfig::default();
    let table = Table::from_columns(vec![
        ("worked_last_7_days", worked(&["Yes", "Yes", "No", "Yes"])),
        (
            "primary_job_income_monthly",
            vec![Value::Int(1000), Value::Missing, Value::Missing, Value::Int(500)],
        ),
    ])
    .unwrap();

    let result = impute_income(&table, &IncomeRule::from_config(&config)).unwrap();
    let income = result.output.column("primary_job_income_monthly").unwrap();

    assert_eq!(income.get(1), Some(&Value::Float(750.0)));
    assert_eq!(income.get(2), Some(&Value::Int(0)));
}

#[test]
fn test_decoder_is_additive() {
    let config = SurveyConfig::default();
    let table = Table::from_columns(vec![
        ("region", vec![Value::Int(1), Value::Int(99), Value::Missing]),
        ("age", vec![Value::Int(20), Value::Int(30), Value::Int(40)]),
    ])
    .unwrap();

    let result = decode_categorical(&table, "region", &config.category_maps["region"]).unwrap();
    let out = &result.output;

    assert_eq!(out.row_count(), table.row_count());
    assert_eq!(out.column("region"), table.column("region"));
    assert_eq!(out.column("age"), table.column("age"));
    let mapped = out.column("region_mapped").unwrap();
    assert_eq!(mapped.values(), &[Value::text("Western"), Value::Missing, Value::Missing]);
    assert!(result.report.warnings[0].contains("Found 1 values"));
}

#[test]
fn test_generic_imputer_leaves_no_missing_in_computable_columns() {
    let config = SurveyConfig::default();
    let table = Table::from_columns(vec![
        (
            "highest_education_level",
            vec![Value::Int(4), Value::Missing, Value::Int(4), Value::Int(2)],
        ),
        (
            "grade_completed",
            vec![Value::Missing, Value::Int(6), Value::Int(2), Value::Missing],
        ),
        ("secondary_job_income_monthly", vec![Value::Missing; 4]),
        (
            "total_medical_expense_last_12m",
            vec![Value::Int(5), Value::Missing, Value::Missing, Value::Int(1)],
        ),
        (
            "marital_status",
            vec![Value::Missing, Value::Missing, Value::Int(3), Value::Int(1)],
        ),
    ])
    .unwrap();

    let result = impute_missing(&table, &config.imputation).unwrap();

    for column in config.imputation.keys() {
        let series = result.output.column(column).unwrap();
        assert_eq!(series.missing_count(), 0, "{} still has missing values", column);
    }
    let out = &result.output;
    assert_eq!(out.column("grade_completed").unwrap().get(0), Some(&Value::Int(4)));
    assert_eq!(out.column("marital_status").unwrap().get(0), Some(&Value::Int(1)));
    assert_eq!(
        out.column("secondary_job_income_monthly").unwrap().get(2),
        Some(&Value::Int(0))
    );
    assert_eq!(result.report.columns_affected.len(), 5);
}

#[test]
fn test_literal_strategy_from_yaml_applies_text() {
    let config = SurveyConfig::from_yaml_str("imputation:\n  marital_status: unknown\n").unwrap();
    let table = Table::from_columns(vec![(
        "marital_status",
        vec![Value::Int(1), Value::Missing],
    )])
    .unwrap();

    assert_eq!(
        config.imputation["marital_status"],
        Strategy::Literal(Value::text("unknown"))
    );
    let out = impute_missing(&table, &config.imputation).unwrap().output;
    assert_eq!(
        out.column("marital_status").unwrap().get(1),
        Some(&Value::text("unknown"))
    );
}
