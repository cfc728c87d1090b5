// src/lib.rs
pub mod config;
pub mod error;
pub mod input_format;
pub mod output_format;
pub mod pipeline;
pub mod processors;
pub mod table;

pub use error::*;
pub use pipeline::{build_cleaning_pipeline, run_survey, RunSummary};

pub use config::{
    CategoryMap, LoadOptions, Strategy, SurveyConfig, WorkStatusConfig, WorkStatusInput,
};
pub use input_format::load_table;
pub use output_format::save_table;
pub use pipeline::config::{ErrorStrategy, PipelineConfig};
pub use pipeline::context::{PipelineSummary, Stage, StageOutput, StageReport, Status};
pub use pipeline::stream::{TablePipeline, TableStage};
pub use table::{DataType, Series, Table, Value};
