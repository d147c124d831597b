// Ranking aggregators over the cleaned table, plus the global KPI summary.
use crate::types::{SummaryStats, Table, Value};
use crate::util::average;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// The two supported geographic granularities, district being coarser.
const AREA_LEVELS: [&str; 2] = ["district", "neighbourhood"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("level must be one of \"district\" or \"neighbourhood\", got `{0}`")]
    InvalidLevel(String),
}

/// Mean nightly price per area, sorted descending. Errors only on an
/// unsupported `level`; a table without that granularity yields an empty
/// result.
pub fn price_by_area(table: &Table, level: &str) -> Result<Table, ReportError> {
    mean_by_area(table, level, "precio_noche", "precio_medio")
}

/// Mean estimated occupancy (days/year) per area, sorted descending.
pub fn occupancy_by_area(table: &Table, level: &str) -> Result<Table, ReportError> {
    mean_by_area(table, level, "ocupacion_estimada", "ocupacion_media")
}

fn mean_by_area(
    table: &Table,
    level: &str,
    metric: &str,
    out_column: &str,
) -> Result<Table, ReportError> {
    if !AREA_LEVELS.contains(&level) {
        return Err(ReportError::InvalidLevel(level.to_string()));
    }
    let (Some(level_idx), Some(metric_idx)) =
        (table.column_index(level), table.column_index(metric))
    else {
        // The granularity (or the metric it would rank) is simply not in
        // this dataset; soft-missing, not an error.
        return Ok(Table::empty());
    };

    // Rows with a missing area or metric are excluded before grouping.
    let mut groups: BTreeMap<String, (Value, Vec<f64>)> = BTreeMap::new();
    for row in table.rows() {
        let Some(key) = row[level_idx].key() else {
            continue;
        };
        let Some(metric_value) = row[metric_idx].as_number() else {
            continue;
        };
        groups
            .entry(key)
            .or_insert_with(|| (row[level_idx].clone(), Vec::new()))
            .1
            .push(metric_value);
    }

    let mut ranked: Vec<(f64, Value)> = groups
        .into_values()
        .map(|(area, values)| (average(&values), area))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut result = Table::new(vec![level.to_string(), out_column.to_string()]);
    for (mean, area) in ranked {
        result.push_row(vec![area, Value::Number(mean)]);
    }
    Ok(result)
}

fn column_mean(table: &Table, name: &str) -> Option<f64> {
    let idx = table.column_index(name)?;
    let values: Vec<f64> = table
        .rows()
        .iter()
        .filter_map(|row| row[idx].as_number())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(average(&values))
    }
}

/// Global KPIs shown in the dashboard header and written to `summary.json`.
pub fn generate_summary(cleaned: &Table) -> SummaryStats {
    SummaryStats {
        total_listings: cleaned.n_rows(),
        avg_nightly_price: column_mean(cleaned, "precio_noche"),
        avg_occupancy_days: column_mean(cleaned, "ocupacion_estimada"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn cleaned_table() -> Table {
        let mut t = Table::new(vec!["district".into(), "precio_noche".into()]);
        t.push_row(vec![text("Centro"), Value::Number(100.0)]);
        t.push_row(vec![text("Centro"), Value::Number(120.0)]);
        t.push_row(vec![text("Retiro"), Value::Number(200.0)]);
        t.push_row(vec![text("Retiro"), Value::Missing]);
        t.push_row(vec![Value::Missing, Value::Number(999.0)]);
        t
    }

    #[test]
    fn price_by_area_ranks_descending_once_per_area() {
        let ranking = price_by_area(&cleaned_table(), "district").unwrap();
        assert_eq!(ranking.columns(), ["district", "precio_medio"]);
        assert_eq!(ranking.n_rows(), 2);
        assert_eq!(ranking.rows()[0][0], text("Retiro"));
        assert_eq!(ranking.rows()[0][1], Value::Number(200.0));
        assert_eq!(ranking.rows()[1][0], text("Centro"));
        assert_eq!(ranking.rows()[1][1], Value::Number(110.0));
    }

    #[test]
    fn price_by_area_without_level_column_is_empty() {
        let mut t = Table::new(vec!["precio_noche".into()]);
        t.push_row(vec![Value::Number(80.0)]);
        let ranking = price_by_area(&t, "neighbourhood").unwrap();
        assert!(ranking.is_empty());
    }

    #[test]
    fn unsupported_level_is_an_error() {
        let err = price_by_area(&cleaned_table(), "city").unwrap_err();
        assert_eq!(err, ReportError::InvalidLevel("city".into()));
        assert!(occupancy_by_area(&cleaned_table(), "planet").is_err());
    }

    #[test]
    fn occupancy_by_area_uses_its_own_metric() {
        let mut t = Table::new(vec!["district".into(), "ocupacion_estimada".into()]);
        t.push_row(vec![text("Centro"), Value::Number(325.0)]);
        let ranking = occupancy_by_area(&t, "district").unwrap();
        assert_eq!(ranking.columns(), ["district", "ocupacion_media"]);
        assert_eq!(ranking.rows()[0][1], Value::Number(325.0));
    }

    #[test]
    fn summary_means_skip_missing_cells() {
        let stats = generate_summary(&cleaned_table());
        assert_eq!(stats.total_listings, 5);
        // 100, 120, 200, 999 are the numeric prices present.
        assert_eq!(stats.avg_nightly_price, Some(1419.0 / 4.0));
        assert_eq!(stats.avg_occupancy_days, None);
    }
}
