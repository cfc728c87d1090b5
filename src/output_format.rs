use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::table::Table;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a table as delimited text with a header row and no index column,
/// creating parent directories as needed.
pub fn save_table(
    table: &Table,
    path: &Path,
    delimiter: u8,
) -> Result<StageOutput<PathBuf>, CleaningError> {
    if table.is_empty() {
        return Err(CleaningError::EmptyTable(Stage::Save));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_table(table, std::io::BufWriter::new(file), delimiter)?;

    let report = StageReport::new(
        Stage::Save,
        format!("Data saved successfully to '{}'", path.display()),
    )
    .rows(table.row_count())
    .columns(table.column_names());
    Ok(StageOutput::new(path.to_path_buf(), report))
}

/// Render a table to any writer. Missing values become empty fields.
pub fn write_table<W: Write>(table: &Table, output: W, delimiter: u8) -> Result<(), CleaningError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(output);

    writer.write_record(table.column_names())?;
    for index in 0..table.row_count() {
        if let Some(row) = table.row(index) {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
    }
    writer.flush()?;
    Ok(())
}
