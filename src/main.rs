// Entry point and console flow.
//
// The binary is a thin stand-in for the dashboard UI:
// - Option [1] loads the four source CSVs, unifies them and runs the
//   cleaning pipeline, printing diagnostics.
// - Option [2] computes the global KPIs and the two district rankings,
//   exports them, and prints Markdown previews.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod cleaning;
mod loader;
mod output;
mod reports;
mod types;
mod unify;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::Table;

// Simple in-memory app state so we only load/unify/clean once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Table>,
}

const LISTINGS_PATH: &str = "data/listings.csv";
const REVIEWS_PATH: &str = "data/reviews.csv";
const NEIGHBOURHOODS_PATH: &str = "data/neighbourhoods.csv";
const IDEALISTA_PATH: &str = "data/idealista.csv";

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_source(label: &str, path: &str) -> Option<Table> {
    match loader::load_table(path) {
        Ok((table, report)) => {
            println!(
                "  {}: {} rows, {} columns ({} empty cells, {} rows skipped)",
                label,
                util::format_int(report.rows as i64),
                report.columns,
                util::format_int(report.missing_cells as i64),
                report.skipped_rows
            );
            Some(table)
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}", path, e);
            None
        }
    }
}

/// Handle option [1]: load, unify and clean the four source tables.
///
/// On success, the cleaned table is stored in `APP_STATE` and a short
/// textual summary of the pipeline is printed. Any read failure aborts the
/// whole load; there is no partial ingestion.
fn handle_load() {
    println!("Loading datasets...");
    let (Some(listings), Some(reviews), Some(neighbourhoods), Some(idealista)) = (
        load_source("listings", LISTINGS_PATH),
        load_source("reviews", REVIEWS_PATH),
        load_source("neighbourhoods", NEIGHBOURHOODS_PATH),
        load_source("idealista", IDEALISTA_PATH),
    ) else {
        eprintln!("Load aborted.\n");
        return;
    };

    let unified = unify::unify_data(&listings, &reviews, &neighbourhoods, &idealista);
    let cleaned = cleaning::clean_dataset(&unified);
    println!(
        "Unified {} listings into {} columns; {} rows after cleaning ({} duplicates removed).\n",
        util::format_int(unified.n_rows() as i64),
        cleaned.columns().len(),
        util::format_int(cleaned.n_rows() as i64),
        util::format_int((unified.n_rows() - cleaned.n_rows()) as i64)
    );

    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(cleaned);
}

/// Handle option [2]: compute KPIs and both district rankings, export them
/// and print previews.
///
/// This function is intentionally side-effectful:
/// - writes two ranking CSV files,
/// - writes a JSON KPI summary,
/// - and prints Markdown previews to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the datasets first (option 1).\n");
        return;
    };

    println!("Generating reports...\n");

    let summary = reports::generate_summary(&data);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Global KPIs (summary.json):");
    println!("  Listings: {}", util::format_int(summary.total_listings as i64));
    match summary.avg_nightly_price {
        Some(price) => println!("  Avg. nightly price: {} €", util::format_number(price, 2)),
        None => println!("  Avg. nightly price: n/a"),
    }
    match summary.avg_occupancy_days {
        Some(days) => println!("  Avg. occupancy (days/year): {}", util::format_number(days, 1)),
        None => println!("  Avg. occupancy (days/year): n/a"),
    }
    println!("");

    let price_ranking = match reports::price_by_area(&data, "district") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Report error: {}", e);
            return;
        }
    };
    let price_file = "ranking_price_by_district.csv";
    if let Err(e) = output::write_csv(price_file, &price_ranking) {
        eprintln!("Write error: {}", e);
    }
    println!("Ranking: districts by mean nightly price");
    output::preview_table(&price_ranking, 10);
    println!("(Full table exported to {})\n", price_file);

    let occupancy_ranking = match reports::occupancy_by_area(&data, "district") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Report error: {}", e);
            return;
        }
    };
    let occupancy_file = "ranking_occupancy_by_district.csv";
    if let Err(e) = output::write_csv(occupancy_file, &occupancy_ranking) {
        eprintln!("Write error: {}", e);
    }
    println!("Ranking: districts by mean estimated occupancy (days/year)");
    output::preview_table(&occupancy_ranking, 10);
    println!("(Full table exported to {})\n", occupancy_file);

    println!("Sample of cleaned records:");
    output::preview_table(&data, 5);
}

fn main() {
    loop {
        println!("GEIA – Short-Term Rental Analytics");
        println!("[1] Load the datasets");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
