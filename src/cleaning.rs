// Cleaning pipeline: price standardization, type coercion, derived columns,
// duplicate removal. Every step takes the input by reference and returns a
// new table; coercion failures become `Missing` cells, never errors.
use crate::types::{ColumnKind, Table, Value};
use crate::util::{parse_date, parse_number, parse_price};

/// Columns treated as prices when the caller does not name any. Covers the
/// naming across the source exports' locales.
pub const DEFAULT_PRICE_COLUMNS: [&str; 4] = ["price", "price_per_night", "precio", "price_m2"];

/// Strip currency symbols and thousands separators from the named columns
/// and coerce them to numbers. Columns not present are skipped; cells that
/// still fail to parse become `Missing`.
pub fn standardize_prices(table: &Table, price_columns: Option<&[&str]>) -> Table {
    let columns = price_columns.unwrap_or(&DEFAULT_PRICE_COLUMNS);
    let mut cleaned = table.clone();
    for name in columns {
        let Some(idx) = cleaned.column_index(name) else {
            continue;
        };
        for row in cleaned.rows_mut() {
            if row[idx].is_missing() {
                continue;
            }
            row[idx] = match parse_price(&row[idx].render()) {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Missing,
            };
        }
    }
    cleaned
}

/// Column-name heuristic for date coercion, checked in both source
/// languages.
fn is_date_column(name: &str) -> bool {
    name.contains("date") || name.contains("fecha")
}

/// Coerce date-named columns to dates (per cell, failures become `Missing`)
/// and remaining all-text columns to numbers.
///
/// The numeric coercion is atomic per column: a text column is converted
/// only when every non-missing cell parses, otherwise the whole column is
/// left as text. Mixed columns are never touched.
pub fn normalize_types(table: &Table) -> Table {
    let mut normalized = table.clone();
    let names: Vec<String> = normalized.columns().to_vec();
    for name in &names {
        if is_date_column(name) {
            coerce_dates(&mut normalized, name);
        } else if normalized.column_kind(name) == Some(ColumnKind::Text) {
            try_coerce_numbers(&mut normalized, name);
        }
    }
    normalized
}

fn coerce_dates(table: &mut Table, name: &str) {
    let Some(idx) = table.column_index(name) else {
        return;
    };
    for row in table.rows_mut() {
        row[idx] = match &row[idx] {
            Value::Date(d) => Value::Date(*d),
            Value::Text(s) => match parse_date(s) {
                Ok(d) => Value::Date(d),
                Err(_) => Value::Missing,
            },
            // Numbers in a date column carry no calendar meaning here.
            Value::Number(_) | Value::Missing => Value::Missing,
        };
    }
}

fn try_coerce_numbers(table: &mut Table, name: &str) {
    let Some(idx) = table.column_index(name) else {
        return;
    };
    let mut parsed: Vec<Option<f64>> = Vec::with_capacity(table.n_rows());
    for row in table.rows() {
        match &row[idx] {
            Value::Missing => parsed.push(None),
            Value::Text(s) => match parse_number(s) {
                Ok(n) => parsed.push(Some(n)),
                // One bad cell keeps the whole column textual.
                Err(_) => return,
            },
            _ => return,
        }
    }
    for (row, value) in table.rows_mut().iter_mut().zip(parsed) {
        row[idx] = match value {
            Some(n) => Value::Number(n),
            None => Value::Missing,
        };
    }
}

/// Numeric coercion of a single cell, used by the enricher. Text goes
/// through the plain number parser; anything unparseable is `Missing`.
fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(*n),
        Value::Text(s) => match parse_number(s) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Missing,
        },
        Value::Date(_) | Value::Missing => Value::Missing,
    }
}

/// Derive the dashboard's two basic columns when their sources exist:
/// `precio_noche` (numeric nightly price) and `ocupacion_estimada`
/// (365 minus availability). Missing inputs propagate; absent source
/// columns are skipped.
pub fn add_basic_columns(table: &Table) -> Table {
    let mut enriched = table.clone();
    if let Some(idx) = enriched.column_index("price") {
        let derived: Vec<Value> = enriched.rows().iter().map(|row| to_number(&row[idx])).collect();
        enriched.set_column("precio_noche", derived);
    }
    if let Some(idx) = enriched.column_index("availability_365") {
        let derived: Vec<Value> = enriched
            .rows()
            .iter()
            .map(|row| match to_number(&row[idx]) {
                Value::Number(n) => Value::Number(365.0 - n),
                _ => Value::Missing,
            })
            .collect();
        enriched.set_column("ocupacion_estimada", derived);
    }
    enriched
}

/// Full cleaning pipeline over the unified table. Enrichment runs after
/// price standardization so `precio_noche` derives from already-numeric
/// data; exact-duplicate removal comes last.
pub fn clean_dataset(table: &Table) -> Table {
    let mut cleaned = standardize_prices(table, None);
    cleaned = normalize_types(&cleaned);
    cleaned = add_basic_columns(&cleaned);
    cleaned.dedup_rows();
    cleaned
}
