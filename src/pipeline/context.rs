use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// The cleaning operations, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Select,
    AgeFilter,
    Drop,
    WorkStatus,
    Income,
    Impute,
    Decode,
    MissingReport,
    Save,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Select => "select",
            Stage::AgeFilter => "age_filter",
            Stage::Drop => "drop",
            Stage::WorkStatus => "work_status",
            Stage::Income => "income",
            Stage::Impute => "impute",
            Stage::Decode => "decode",
            Stage::MissingReport => "missing_report",
            Stage::Save => "save",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    /// Completed, but something was skipped or left non-conformant
    Warning,
}

/// Structured diagnostic for one stage run
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: Status,
    pub message: String,
    pub rows_affected: usize,
    pub columns_affected: Vec<String>,
    pub warnings: Vec<String>,
    /// Informational lines (skipped columns, names not found)
    pub notes: Vec<String>,
}

impl StageReport {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        StageReport {
            stage,
            status: Status::Ok,
            message: message.into(),
            rows_affected: 0,
            columns_affected: Vec::new(),
            warnings: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows_affected = rows;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_affected = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Record a warning; the report status is downgraded accordingly.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.status = Status::Warning;
        self.warnings.push(warning.into());
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn log(&self) {
        tracing::info!(
            stage = %self.stage,
            rows = self.rows_affected,
            columns = self.columns_affected.len(),
            "{}",
            self.message
        );
        for note in &self.notes {
            tracing::info!(stage = %self.stage, "{}", note);
        }
        for warning in &self.warnings {
            tracing::warn!(stage = %self.stage, "{}", warning);
        }
    }
}

/// Output of a stage together with its report
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub output: T,
    pub report: StageReport,
}

impl<T> StageOutput<T> {
    pub fn new(output: T, report: StageReport) -> Self {
        StageOutput { output, report }
    }

    pub fn into_parts(self) -> (T, StageReport) {
        (self.output, self.report)
    }
}

/// Runtime statistics for a pipeline pass
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineSummary {
    pub reports: Vec<StageReport>,
    pub stages_run: usize,
    pub warnings: usize,
    pub errors: usize,
    /// Failed stages (under the skip strategy) with their error text
    pub failures: Vec<(Stage, String)>,
    #[serde(skip)]
    pub processing_time: Duration,
}

impl PipelineSummary {
    pub fn record(&mut self, report: StageReport) {
        self.stages_run += 1;
        if !report.is_ok() {
            self.warnings += 1;
        }
        self.reports.push(report);
    }

    pub fn record_failure(&mut self, stage: Stage, error: String) {
        self.stages_run += 1;
        self.errors += 1;
        self.failures.push((stage, error));
    }

    pub fn merge(&mut self, other: PipelineSummary) {
        self.reports.extend(other.reports);
        self.stages_run += other.stages_run;
        self.warnings += other.warnings;
        self.errors += other.errors;
        self.failures.extend(other.failures);
        self.processing_time += other.processing_time;
    }

    pub fn report_for(&self, stage: Stage) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }
}
