// src/pipeline/stream.rs
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::CleaningError;
use crate::pipeline::config::{ErrorStrategy, PipelineConfig};
use crate::pipeline::context::{PipelineSummary, Stage, StageOutput};
use crate::table::Table;

/// Main trait for table cleaning steps
pub trait TableStage: Send + Sync {
    /// Produce a new table; the input is never modified.
    fn apply(&self, table: &Table) -> Result<StageOutput<Table>, CleaningError>;
    fn stage(&self) -> Stage;
    fn name(&self) -> &str {
        self.stage().as_str()
    }
}

/// Runs stages in order over a table
pub struct TablePipeline {
    stages: Vec<Box<dyn TableStage>>,
    config: PipelineConfig,
}

impl TablePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        TablePipeline {
            stages: Vec::new(),
            config,
        }
    }

    pub fn add_stage(&mut self, stage: Box<dyn TableStage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Thread `input` through every stage.
    ///
    /// Under `ErrorStrategy::Skip` a stage failing with a recoverable error
    /// is recorded and the next stage receives the table the failed stage
    /// was given.
    pub fn process_table(&self, input: &Table) -> Result<(Table, PipelineSummary), CleaningError> {
        let start_time = Instant::now();
        let mut summary = PipelineSummary::default();
        let mut current = input.clone();

        for stage in &self.stages {
            debug!(
                stage = stage.name(),
                rows = current.row_count(),
                columns = current.column_count(),
                "applying stage"
            );
            match stage.apply(&current) {
                Ok(output) => {
                    let (table, report) = output.into_parts();
                    report.log();
                    summary.record(report);
                    current = table;
                    if self.config.debug {
                        info!(
                            stage = stage.name(),
                            rows = current.row_count(),
                            columns = current.column_count(),
                            "table shape"
                        );
                    }
                }
                Err(err) => match self.config.error_strategy {
                    ErrorStrategy::Skip if err.is_recoverable() => {
                        warn!(stage = stage.name(), "{}; continuing with unchanged table", err);
                        summary.record_failure(stage.stage(), err.to_string());
                    }
                    _ => return Err(err),
                },
            }
        }

        summary.processing_time = start_time.elapsed();
        Ok((current, summary))
    }
}
