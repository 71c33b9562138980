use crate::utils::error::WorkerError;
use calamine::{open_workbook_auto, Data, Reader};
use rag_chunker::TableBlock;
use std::path::Path;
use tracing::{debug, warn};

/// One table per non-empty worksheet, as `(sheet name, table)`.
pub fn load_workbook(path: &Path) -> Result<Vec<(String, TableBlock)>, WorkerError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut tables = Vec::new();

    for sheet_name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => {
                warn!("Skipping sheet '{}': {}", sheet_name, e);
                continue;
            }
        };

        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

        match rows_to_table(rows) {
            Some(table) => {
                debug!("Sheet '{}': {} rows", sheet_name, table.rows.len());
                tables.push((sheet_name, table));
            }
            None => debug!("Sheet '{}' is empty", sheet_name),
        }
    }

    Ok(tables)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// First non-blank row becomes the header; blank rows are dropped.
pub fn rows_to_table<I>(rows: I) -> Option<TableBlock>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));

    let header = rows.next()?;
    Some(TableBlock::new(header, rows.collect()))
}
