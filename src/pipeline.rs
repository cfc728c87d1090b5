pub mod config;
pub mod context;
pub mod stream;

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::SurveyConfig;
use crate::error::CleaningError;
use crate::input_format::load_table;
use crate::output_format::save_table;
use crate::processors::{
    missing_values_summary, AgeFilter, DecodeCategorical, DropColumns, ImputeIncome,
    ImputeMissing, IncomeRule, MissingSummary, NormalizeWorkStatus, SelectColumns,
};
use crate::table::Table;
use self::config::{ErrorStrategy, PipelineConfig};
use self::context::{PipelineSummary, Stage, StageReport};
use self::stream::{TablePipeline, TableStage};

/// Outcome of a full survey cleaning run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub rows_selected: usize,
    pub rows_written: usize,
    pub selected_path: Option<PathBuf>,
    pub cleaned_path: Option<PathBuf>,
    pub missing: Option<MissingSummary>,
    pub summary: PipelineSummary,
}

/// Stages between the selected extract and the cleaned table:
/// age filter, drop, work status, income, generic imputation, then one
/// decoder per category map.
pub fn build_cleaning_pipeline(survey: &SurveyConfig, config: PipelineConfig) -> TablePipeline {
    let mut pipeline = TablePipeline::new(config);
    pipeline.add_stage(Box::new(
        AgeFilter::new(survey.min_age)
            .with_column(survey.age_column.clone())
            .report_unparseable(survey.report_unparseable_ages),
    ));
    pipeline.add_stage(Box::new(DropColumns::new(survey.drop_after_age_filter.clone())));
    pipeline.add_stage(Box::new(NormalizeWorkStatus::new(survey.work_status.clone())));
    pipeline.add_stage(Box::new(ImputeIncome::new(IncomeRule::from_config(survey))));
    pipeline.add_stage(Box::new(ImputeMissing::new(survey.imputation.clone())));
    for (column, mapping) in &survey.category_maps {
        pipeline.add_stage(Box::new(DecodeCategorical::new(column.clone(), mapping.clone())));
    }
    pipeline
}

/// Load, select, persist the selection, clean, report and persist the result.
pub fn run_survey(
    survey: &SurveyConfig,
    config: &PipelineConfig,
) -> Result<RunSummary, CleaningError> {
    survey.validate()?;
    let start_time = Instant::now();
    let delimiter = survey.load.delimiter_byte()?;
    let mut summary = PipelineSummary::default();

    let (raw, report) = load_table(&survey.paths.raw, &survey.load)?.into_parts();
    let rows_loaded = raw.row_count();
    record(&mut summary, report);

    let (selected, report) = SelectColumns::new(survey.column_map.clone())
        .apply(&raw)?
        .into_parts();
    drop(raw);
    let rows_selected = selected.row_count();
    record(&mut summary, report);

    let selected_path =
        persist(&selected, &survey.paths.selected, delimiter, config, &mut summary)?;

    let pipeline = build_cleaning_pipeline(survey, config.clone());
    let (cleaned, stage_summary) = pipeline.process_table(&selected)?;
    summary.merge(stage_summary);

    let missing = match missing_values_summary(&cleaned) {
        Ok(output) => {
            let (missing, report) = output.into_parts();
            record(&mut summary, report);
            Some(missing)
        }
        Err(err) => {
            tolerate(Stage::MissingReport, err, config, &mut summary)?;
            None
        }
    };

    let cleaned_path = persist(&cleaned, &survey.paths.cleaned, delimiter, config, &mut summary)?;
    let rows_written = if cleaned_path.is_some() { cleaned.row_count() } else { 0 };

    summary.processing_time = start_time.elapsed();
    info!(
        rows_loaded,
        rows_written,
        warnings = summary.warnings,
        errors = summary.errors,
        elapsed = ?summary.processing_time,
        "cleaning run finished"
    );

    Ok(RunSummary {
        rows_loaded,
        rows_selected,
        rows_written,
        selected_path,
        cleaned_path,
        missing,
        summary,
    })
}

fn record(summary: &mut PipelineSummary, report: StageReport) {
    report.log();
    summary.record(report);
}

fn persist(
    table: &Table,
    path: &std::path::Path,
    delimiter: u8,
    config: &PipelineConfig,
    summary: &mut PipelineSummary,
) -> Result<Option<PathBuf>, CleaningError> {
    match save_table(table, path, delimiter) {
        Ok(output) => {
            let (path, report) = output.into_parts();
            record(summary, report);
            Ok(Some(path))
        }
        Err(err) => {
            tolerate(Stage::Save, err, config, summary)?;
            Ok(None)
        }
    }
}

/// Save and report failures do not stop a run unless failing fast.
fn tolerate(
    stage: Stage,
    err: CleaningError,
    config: &PipelineConfig,
    summary: &mut PipelineSummary,
) -> Result<(), CleaningError> {
    if config.error_strategy == ErrorStrategy::FailFast {
        return Err(err);
    }
    warn!(stage = %stage, "{}", err);
    summary.record_failure(stage, err.to_string());
    Ok(())
}
