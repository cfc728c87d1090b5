// src/input_format.rs - Delimited file loading with encoding fallback

use crate::config::LoadOptions;
use crate::error::CleaningError;
use crate::pipeline::context::{Stage, StageOutput, StageReport};
use crate::table::{Series, Table};
use encoding_rs::Encoding;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Read a delimited file into a table, trying each configured encoding in order.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<StageOutput<Table>, CleaningError> {
    if !path.exists() {
        return Err(CleaningError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_with_fallback(&bytes, &options.encodings).ok_or_else(|| {
        CleaningError::DecodeFailed {
            path: path.display().to_string(),
            tried: options.encodings.clone(),
        }
    })?;
    debug!(path = %path.display(), encoding, "decoded input");

    let (table, renamed) = parse_delimited(&text, options)?;
    let mut report = StageReport::new(
        Stage::Load,
        format!(
            "File loaded with {} encoding from '{}' ({} rows, {} columns)",
            encoding,
            path.display(),
            table.row_count(),
            table.column_count()
        ),
    )
    .rows(table.row_count())
    .columns(table.column_names());
    for (original, renamed) in renamed {
        report.note(format!(
            "Duplicate column '{}' renamed to '{}'",
            original, renamed
        ));
    }

    Ok(StageOutput::new(table, report))
}

/// Decode strictly with the first encoding that accepts every byte.
/// Returns the text and the label that worked.
pub fn decode_with_fallback<'a>(bytes: &[u8], labels: &'a [String]) -> Option<(String, &'a str)> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    for label in labels {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            debug!(label = %label, "unknown encoding label, skipping");
            continue;
        };
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => return Some((text.into_owned(), label.as_str())),
            None => debug!(encoding = %label, "decode failed, trying next encoding"),
        }
    }
    None
}

/// Parse delimited text with a header row into a type-inferred table.
///
/// Repeated header names get a `.1`, `.2`, ... suffix so no column is lost;
/// the `(original, renamed)` pairs are returned alongside the table.
pub fn parse_delimited(
    text: &str,
    options: &LoadOptions,
) -> Result<(Table, Vec<(String, String)>), CleaningError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter_byte()?)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let (headers, renamed) = unique_headers(headers);

    let mut fields: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in fields.iter_mut().zip(record.iter()) {
            let trimmed = field.trim();
            column.push(if options.is_na(trimmed) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let mut table = Table::new();
    for (name, column) in headers.into_iter().zip(fields) {
        table.insert_column(name, Series::from_fields(column))?;
    }
    Ok((table, renamed))
}

fn unique_headers(headers: Vec<String>) -> (Vec<String>, Vec<(String, String)>) {
    let mut seen: HashSet<String> = headers.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut renamed = Vec::new();
    let mut unique = Vec::with_capacity(headers.len());

    for header in headers {
        if used.insert(header.clone()) {
            unique.push(header);
            continue;
        }
        let mut suffix = 1;
        let candidate = loop {
            let candidate = format!("{}.{}", header, suffix);
            if !seen.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        seen.insert(candidate.clone());
        used.insert(candidate.clone());
        renamed.push((header, candidate.clone()));
        unique.push(candidate);
    }
    (unique, renamed)
}
