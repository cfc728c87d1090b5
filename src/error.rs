use crate::pipeline::context::Stage;

#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not decode '{path}' with any of: {}", .tried.join(", "))]
    DecodeFailed { path: String, tried: Vec<String> },

    #[error("Column '{column}' not found ({stage})")]
    ColumnNotFound { stage: Stage, column: String },

    #[error("None of the requested columns exist in the table")]
    NoColumnsSelected,

    #[error("Input table is empty ({0})")]
    EmptyTable(Stage),

    #[error("Column '{column}' is not numeric ({stage})")]
    NonNumericColumn { stage: Stage, column: String },

    #[error("Column '{column}' has {found} values but the table has {expected} rows")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl CleaningError {
    /// Whether the pipeline can carry on with the unchanged table.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CleaningError::ColumnNotFound { .. }
                | CleaningError::NonNumericColumn { .. }
                | CleaningError::EmptyTable(_)
        )
    }
}
