use crate::types::{Table, Value};
use csv::ReaderBuilder;
use std::error::Error;

/// Diagnostics from loading one CSV source, reported on the console after
/// ingestion.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub skipped_rows: usize,
}

/// Read a delimited file with a header row into a `Table`.
///
/// Every cell comes in as trimmed `Text`; type coercion is the cleaning
/// pipeline's job, not the loader's. Trimming keeps padded join keys like
/// `" 1"` matching `"1"` across sources. Cells that are empty (or blank
/// after trimming) become `Missing`. Rows the CSV reader cannot decode are
/// counted and skipped; an unreadable file is fatal.
pub fn load_table(path: &str) -> Result<(Table, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut table = Table::new(headers);
    let mut missing_cells = 0usize;
    let mut skipped_rows = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                skipped_rows += 1;
                continue;
            }
        };
        let row: Vec<Value> = record
            .iter()
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    missing_cells += 1;
                    Value::Missing
                } else {
                    Value::Text(field.to_string())
                }
            })
            .collect();
        // Short rows are padded with `Missing` by `push_row`; count those too.
        if row.len() < table.columns().len() {
            missing_cells += table.columns().len() - row.len();
        }
        table.push_row(row);
    }

    let report = LoadReport {
        rows: table.n_rows(),
        columns: table.columns().len(),
        missing_cells,
        skipped_rows,
    };
    Ok((table, report))
}
