mod aggregate;
mod config;
mod error;
mod form;
mod listing;
mod parse;
mod record;
mod store;
mod view;

use crate::aggregate::{
    Count, Insights, Statistics, counts_by_building, counts_by_condition, counts_by_species,
};
use crate::config::StoreConfig;
use crate::form::ReportForm;
use crate::listing::{
    ConditionFilter, ReportRow, filter_reports, format_date, format_time, redact_report, rows,
};
use crate::parse::{Args, Command, SubmitArgs};
use crate::record::{BUILDINGS, COMMON_SPECIES, StrikeReport};
use crate::store::{ReportStore, RestStore};
use crate::view::ViewState;
use chrono::Utc;
use clap::Parser;
use csv::Writer;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs::File;
use std::time::Duration;

const BAR_WIDTH: usize = 40;

/// Loads one view's reports behind a spinner.
async fn fetch_view(store: &dyn ReportStore, view: &str, progress: &MultiProgress) -> ViewState {
    let spinner = progress.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Loading {}...", view));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let state = ViewState::load(store, view).await;
    spinner.finish_and_clear();
    state
}

fn print_chart(title: &str, counts: &[Count]) {
    println!("\n{}:", title);
    if counts.is_empty() {
        println!("  (no data)");
        return;
    }
    let max = counts.iter().map(|c| c.count).max().unwrap_or(1).max(1);
    let width = counts.iter().map(|c| c.label.len()).max().unwrap_or(0);
    for c in counts {
        let bar = "#".repeat((c.count * BAR_WIDTH).div_ceil(max));
        println!("  {:<width$} {:>5} {}", c.label, c.count, bar, width = width);
    }
}

pub fn print_dashboard(state: &ViewState) {
    if let Some(e) = state.error() {
        println!("Could not load reports: {}", e);
    }
    let reports = state.reports();
    let now = Utc::now();
    let stats = Statistics::from_reports(reports, now);

    println!("\nDashboard:");
    for line in stats.headline() {
        println!("  {}", line);
    }

    print_chart("Strikes by building", &counts_by_building(reports));
    print_chart("Bird condition", &counts_by_condition(reports));
    print_chart("Species affected", &counts_by_species(reports));
    for note in stats.truncation_notes() {
        println!("  {}", note);
    }

    let insights = Insights::from_reports(reports, now);
    println!("\nKey insights:");
    for line in &insights.lines {
        println!("  - {}", line);
    }
    if insights.needs_more_data {
        println!("  Tip: more meaningful patterns will emerge as additional reports are collected.");
    }
}

fn print_row(row: &ReportRow) {
    println!(
        "\n{}  {} at {}  [{}]",
        row.building, row.date, row.time, row.condition
    );
    if let Some(location) = &row.location {
        println!("  Location: {}", location);
    }
    if let Some(species) = &row.species {
        println!("  Species: {}", species);
    }
    if let Some(notes) = &row.notes {
        println!("  Notes: {}", notes);
    }
    if let Some(reporter) = &row.reporter {
        println!("  Reported by: {}", reporter);
    }
}

pub fn print_list(state: &ViewState, filter: ConditionFilter) {
    if let Some(e) = state.error() {
        println!("Could not load reports: {}", e);
    }
    let rows = rows(state.reports(), filter);
    println!("\nReports ({}):", rows.len());
    if rows.is_empty() {
        println!("  No reports found.");
    }
    for row in &rows {
        print_row(row);
    }
}

/// Save records to CSV file, reporter emails redacted
pub fn save_to_csv(
    records: &[StrikeReport],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    for record in records {
        writer.serialize(redact_report(record))?;
    }

    writer.flush()?;
    info!("Data saved to {}", filename);
    Ok(())
}

/// Fills a form from the command line; absent date/time keep the form's "now" defaults.
fn form_from_args(args: SubmitArgs) -> ReportForm {
    let mut form = ReportForm::default();
    if let Some(date) = args.date {
        form.date = date;
    }
    if args.no_time {
        form.time.clear();
    } else if let Some(time) = args.time {
        form.time = time;
    }
    form.building = args.building;
    form.bird_condition = args.condition;
    form.location = args.location.unwrap_or_default();
    form.species = args.species.unwrap_or_default();
    form.reporter_email = args.email.unwrap_or_default();
    form.notes = args.notes.unwrap_or_default();
    form
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::try_parse()?;
    // Initialize logger
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = StoreConfig::new(&args.url, &args.key)?
        .with_table(&args.table)
        .with_timeout(args.timeout);
    let store = RestStore::new(config)?;
    let progress = MultiProgress::new();

    match args.command {
        Command::Dashboard => {
            let state = fetch_view(&store, "dashboard", &progress).await;
            print_dashboard(&state);
        }
        Command::List { condition } => {
            let state = fetch_view(&store, "reports", &progress).await;
            print_list(&state, condition);
        }
        Command::Overview { condition } => {
            let (dashboard, list) = futures::join!(
                fetch_view(&store, "dashboard", &progress),
                fetch_view(&store, "reports", &progress)
            );
            print_dashboard(&dashboard);
            print_list(&list, condition);
        }
        Command::Submit(submit) => {
            let mut form = form_from_args(submit);
            match form.submit(&store).await {
                Ok(stored) => {
                    for report in &stored {
                        println!(
                            "Report #{} saved: {} {} at {}",
                            report.id.map(|id| id.to_string()).unwrap_or_default(),
                            report.building,
                            format_date(report.date),
                            format_time(report.time)
                        );
                    }
                }
                Err(e) => {
                    println!("Error submitting report: {}", e);
                    println!("Your entries were kept: {:?}", form);
                    return Err(e.into());
                }
            }
        }
        Command::Export { output, condition } => {
            let state = fetch_view(&store, "export", &progress).await;
            if let Some(e) = state.error() {
                warn!("Exporting without data: {}", e);
            }
            let records = filter_reports(state.reports(), condition);
            save_to_csv(&records, &output)?;
            println!("Saved {} reports to {}", records.len(), output);
        }
        Command::Buildings => {
            for building in BUILDINGS {
                println!("{}", building);
            }
        }
        Command::Species => {
            for species in COMMON_SPECIES {
                println!("{}", species);
            }
        }
    }

    Ok(())
}
