// Unification of the four source tables: review aggregation, neighbourhood
// schema normalization, and the left-join chain onto listings.
use crate::types::{Table, Value};
use crate::util::{average, parse_number};
use std::collections::{BTreeMap, HashMap};

/// Aggregate reviews to one row per listing with the mean rating.
///
/// Returns an empty table when reviews carry no `listing_id` or no `rating`
/// column; both are soft conditions, not errors. Rows with a missing
/// `listing_id` are ignored. A listing whose ratings are all unparseable
/// keeps a `Missing` rating.
pub fn summarize_reviews(reviews: &Table) -> Table {
    let Some(id_idx) = reviews.column_index("listing_id") else {
        return Table::empty();
    };
    let Some(rating_idx) = reviews.column_index("rating") else {
        return Table::empty();
    };

    // BTreeMap keeps the grouping order deterministic across runs.
    let mut groups: BTreeMap<String, (Value, Vec<f64>)> = BTreeMap::new();
    for row in reviews.rows() {
        let Some(key) = row[id_idx].key() else {
            continue;
        };
        let entry = groups
            .entry(key)
            .or_insert_with(|| (row[id_idx].clone(), Vec::new()));
        match &row[rating_idx] {
            Value::Number(n) => entry.1.push(*n),
            Value::Text(s) => {
                if let Ok(n) = parse_number(s) {
                    entry.1.push(n);
                }
            }
            _ => {}
        }
    }

    let mut summary = Table::new(vec!["listing_id".into(), "rating".into()]);
    for (_, (id, ratings)) in groups {
        let rating = if ratings.is_empty() {
            Value::Missing
        } else {
            Value::Number(average(&ratings))
        };
        summary.push_row(vec![id, rating]);
    }
    summary
}

/// Rename source-specific column aliases to the canonical schema:
/// `neighbourhood_cleansed` → `neighbourhood` on listings and
/// `neighbourhood_group` → `district` on the reference table. Pure rename.
pub fn normalize_neighbourhoods(listings: &Table, neighbourhoods: &Table) -> (Table, Table) {
    let mut listings_norm = listings.clone();
    listings_norm.rename_column("neighbourhood_cleansed", "neighbourhood");
    let mut neighbourhoods_norm = neighbourhoods.clone();
    neighbourhoods_norm.rename_column("neighbourhood_group", "district");
    (listings_norm, neighbourhoods_norm)
}

/// Left join `right` onto `left` on `left_on` = `right_on`.
///
/// Every left row survives. Unmatched joined cells are `Missing`; a key
/// matching several right rows fans out to one output row per match. Right
/// columns colliding with a left column are suffixed; when `drop_right_key`
/// is set the right key column is omitted (same-name key joins). A missing
/// key column on either side skips the join and returns the left table.
fn left_join(
    left: &Table,
    right: &Table,
    left_on: &str,
    right_on: &str,
    drop_right_key: bool,
    suffix: &str,
) -> Table {
    let (Some(left_key), Some(right_key)) =
        (left.column_index(left_on), right.column_index(right_on))
    else {
        return left.clone();
    };

    let mut kept_right: Vec<usize> = Vec::new();
    let mut columns: Vec<String> = left.columns().to_vec();
    for (idx, name) in right.columns().iter().enumerate() {
        if drop_right_key && idx == right_key {
            continue;
        }
        kept_right.push(idx);
        if left.has_column(name) {
            columns.push(format!("{}{}", name, suffix));
        } else {
            columns.push(name.clone());
        }
    }

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows().iter().enumerate() {
        if let Some(key) = row[right_key].key() {
            index.entry(key).or_default().push(row_idx);
        }
    }

    let mut joined = Table::new(columns);
    for row in left.rows() {
        let matches = row[left_key].key().and_then(|k| index.get(&k));
        match matches {
            Some(row_indices) => {
                for &right_idx in row_indices {
                    let mut out = row.clone();
                    for &col in &kept_right {
                        out.push(right.rows()[right_idx][col].clone());
                    }
                    joined.push_row(out);
                }
            }
            None => {
                let mut out = row.clone();
                out.extend(kept_right.iter().map(|_| Value::Missing));
                joined.push_row(out);
            }
        }
    }
    joined
}

/// Unify listings with the review summary and the neighbourhood reference.
///
/// Each join only runs when its keys exist on both sides; otherwise the
/// table passes through unchanged. The `_idealista` price reference is
/// accepted but deliberately not joined: reconciling it needs an
/// address/geometry mapping that is out of scope, so the integration stays
/// deferred rather than half-done.
pub fn unify_data(
    listings: &Table,
    reviews: &Table,
    neighbourhoods: &Table,
    _idealista: &Table,
) -> Table {
    let (mut unified, neighbourhoods_ref) = normalize_neighbourhoods(listings, neighbourhoods);
    let reviews_summary = summarize_reviews(reviews);
    if !reviews_summary.is_empty() && unified.has_column("id") {
        unified = left_join(&unified, &reviews_summary, "id", "listing_id", false, "_y");
    }
    if unified.has_column("neighbourhood") && neighbourhoods_ref.has_column("neighbourhood") {
        unified = left_join(
            &unified,
            &neighbourhoods_ref,
            "neighbourhood",
            "neighbourhood",
            true,
            "_ref",
        );
    }
    unified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut t = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn summarize_reviews_means_per_listing() {
        let reviews = table(
            &["listing_id", "rating"],
            vec![
                vec![text("1"), text("4")],
                vec![text("1"), text("5")],
                vec![text("2"), text("3")],
            ],
        );
        let summary = summarize_reviews(&reviews);
        assert_eq!(summary.n_rows(), 2);
        let by_id: Vec<(String, Value)> = summary
            .rows()
            .iter()
            .map(|r| (r[0].render(), r[1].clone()))
            .collect();
        assert!(by_id.contains(&("1".to_string(), Value::Number(4.5))));
        assert!(by_id.contains(&("2".to_string(), Value::Number(3.0))));
    }

    #[test]
    fn summarize_reviews_without_required_columns_is_empty() {
        let no_ids = table(&["rating"], vec![vec![text("4")]]);
        assert!(summarize_reviews(&no_ids).is_empty());
        let no_ratings = table(&["listing_id"], vec![vec![text("1")]]);
        assert!(summarize_reviews(&no_ratings).is_empty());
    }

    #[test]
    fn unify_keeps_listings_without_reviews() {
        let listings = table(&["id"], vec![vec![text("1")], vec![text("99")]]);
        let reviews = table(&["listing_id", "rating"], vec![vec![text("1"), text("4")]]);
        let unified = unify_data(&listings, &reviews, &Table::empty(), &Table::empty());
        assert_eq!(unified.n_rows(), 2);
        let rating_idx = unified.column_index("rating").unwrap();
        assert_eq!(unified.rows()[0][rating_idx], Value::Number(4.0));
        assert_eq!(unified.rows()[1][rating_idx], Value::Missing);
    }

    #[test]
    fn unify_joins_neighbourhood_reference_with_suffix() {
        let listings = table(
            &["id", "neighbourhood_cleansed"],
            vec![vec![text("1"), text("Centro")]],
        );
        let neighbourhoods = table(
            &["neighbourhood", "neighbourhood_group", "id"],
            vec![vec![text("Centro"), text("Distrito Centro"), text("n-1")]],
        );
        let unified = unify_data(&listings, &Table::empty(), &neighbourhoods, &Table::empty());
        let district_idx = unified.column_index("district").unwrap();
        assert_eq!(unified.rows()[0][district_idx], text("Distrito Centro"));
        // Collision with the listings `id` column gets the reference suffix.
        let ref_idx = unified.column_index("id_ref").unwrap();
        assert_eq!(unified.rows()[0][ref_idx], text("n-1"));
        // The canonical key column appears once.
        let key_count = unified.columns().iter().filter(|c| *c == "neighbourhood").count();
        assert_eq!(key_count, 1);
    }

    #[test]
    fn unify_fans_out_duplicated_reference_rows_and_keeps_listing_id() {
        let listings = table(
            &["id", "neighbourhood_cleansed"],
            vec![vec![text("1"), text("Centro")]],
        );
        let reviews = table(&["listing_id", "rating"], vec![vec![text("1"), text("4")]]);
        // The reference table carries Centro twice with different districts.
        let neighbourhoods = table(
            &["neighbourhood", "neighbourhood_group"],
            vec![
                vec![text("Centro"), text("Distrito Centro")],
                vec![text("Centro"), text("Distrito Sur")],
            ],
        );
        let unified = unify_data(&listings, &reviews, &neighbourhoods, &Table::empty());
        // One output row per matching reference row, none dropped.
        assert_eq!(unified.n_rows(), 2);
        let district_idx = unified.column_index("district").unwrap();
        assert_eq!(unified.rows()[0][district_idx], text("Distrito Centro"));
        assert_eq!(unified.rows()[1][district_idx], text("Distrito Sur"));
        // The review join keeps its right-side key next to `id`.
        let listing_id_idx = unified.column_index("listing_id").unwrap();
        for row in unified.rows() {
            assert_eq!(row[listing_id_idx], text("1"));
            assert_eq!(row[unified.column_index("rating").unwrap()], Value::Number(4.0));
        }
    }

    #[test]
    fn unify_skips_join_when_no_name_column_exists() {
        let listings = table(
            &["id", "neighbourhood_cleansed"],
            vec![vec![text("1"), text("Centro")]],
        );
        let neighbourhoods = table(
            &["neighbourhood_group"],
            vec![vec![text("Distrito Centro")]],
        );
        let unified = unify_data(&listings, &Table::empty(), &neighbourhoods, &Table::empty());
        assert!(!unified.has_column("district"));
        assert_eq!(unified.n_rows(), 1);
    }
}
