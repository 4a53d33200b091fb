use std::collections::HashMap;
use std::io::Read;

use super::mapping::{column_for_normalized, Column};
use super::normalizer::normalize_header;

#[derive(Debug)]
pub(crate) struct PlanilhaRow {
    pub(crate) line: u64,
    cells: HashMap<Column, String>,
}

impl PlanilhaRow {
    /// Trimmed cell content; blank cells read as `None`.
    pub(crate) fn cell(&self, column: Column) -> Option<&str> {
        self.cells
            .get(&column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug)]
pub(crate) struct PlanilhaSheet {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<PlanilhaRow>,
}

impl PlanilhaSheet {
    pub(crate) fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }
}

/// Spreadsheet exports with a Brazilian locale separate fields with `;`.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

pub(crate) fn parse_sheet<R: Read>(mut reader: R) -> Result<PlanilhaSheet, csv::Error> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    // unknown headers are ignored; a repeated header keeps its first position
    let mut positions: Vec<(usize, Column)> = Vec::new();
    for (index, header) in csv_reader.headers()?.iter().enumerate() {
        if let Some(column) = column_for_normalized(&normalize_header(header)) {
            if positions.iter().all(|(_, known)| *known != column) {
                positions.push((index, column));
            }
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        let cells = positions
            .iter()
            .filter_map(|(index, column)| {
                record
                    .get(*index)
                    .map(|value| (*column, value.to_string()))
            })
            .collect();
        rows.push(PlanilhaRow { line, cells });
    }

    Ok(PlanilhaSheet {
        columns: positions.into_iter().map(|(_, column)| column).collect(),
        rows,
    })
}
