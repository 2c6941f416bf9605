use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use super::mapping::FieldMapping;
use crate::error::{AllotError, Result};

/// One spreadsheet row: column header -> trimmed cell value.
pub type StudentRecord = HashMap<String, String>;

/// How many non-blank rows are searched for the header row.
const HEADER_SEARCH_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct Roster {
    pub headers: Vec<String>,
    pub students: Vec<StudentRecord>,
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

fn contains_all_mapped(record: &StringRecord, mapping: &FieldMapping) -> bool {
    let mut columns = mapping.columns().peekable();
    if columns.peek().is_none() {
        return false;
    }
    columns.all(|(_, column)| record.iter().any(|cell| cell.trim() == column))
}

/// Picks the header row: the first of the leading rows that names every mapped
/// column, or the first row if none does.
fn detect_header(rows: &[StringRecord], mapping: &FieldMapping) -> usize {
    rows.iter()
        .take(HEADER_SEARCH_ROWS)
        .position(|row| contains_all_mapped(row, mapping))
        .unwrap_or(0)
}

/// Reads an uploaded roster. Title rows above the header are skipped.
pub fn read_roster<R: Read>(input: R, mapping: &FieldMapping) -> Result<Roster> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if !is_blank(&record) {
            rows.push(record);
        }
    }

    if rows.is_empty() {
        return Err(AllotError::EmptyRoster);
    }

    let header_index = detect_header(&rows, mapping);
    if header_index > 0 {
        debug!("Skipping {} row(s) above the detected header", header_index);
    }

    let headers: Vec<String> = rows[header_index]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect();

    let missing = mapping.missing_columns(&headers);
    for (role, column) in &missing {
        warn!("Mapped column {column:?} for {role} not found in spreadsheet header");
    }

    let students = rows[header_index + 1..]
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell.trim().to_string()))
                .collect::<StudentRecord>()
        })
        .collect::<Vec<_>>();

    debug!("Read {} student row(s) with {} column(s)", students.len(), headers.len());

    Ok(Roster { headers, students })
}

pub fn load_roster<P: AsRef<Path>>(path: P, mapping: &FieldMapping) -> Result<Roster> {
    let file = std::fs::File::open(path)?;
    read_roster(file, mapping)
}
