use crate::types::{Table, Value};
use crate::util::format_number;
use serde::Serialize;
use std::error::Error;
use tabled::{builder::Builder, settings::Style};

/// Export a table to CSV: header row plus plainly rendered cells, with
/// missing cells written as empty fields.
pub fn write_csv(path: &str, table: &Table) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(Value::render))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn preview_cell(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n, 2),
        other => other.render(),
    }
}

/// Print the first `max_rows` rows of a table as a Markdown table. The
/// column set is dynamic, so this goes through tabled's builder rather than
/// a derived row type.
pub fn preview_table(table: &Table, max_rows: usize) {
    if table.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().cloned());
    for row in table.rows().iter().take(max_rows) {
        builder.push_record(row.iter().map(preview_cell));
    }
    let rendered = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", rendered);
}
