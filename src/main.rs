// Entry point and high-level console flow.
//
// The binary stands in for the dashboard UI:
// - Option [1] loads the flat records and prints diagnostics.
// - Option [2] regroups the filtered records for every report view, exports
//   each one and previews it.
// - Options [3]/[4] edit the persisted filter selection.
// - Option [5] plays one pass of the report slideshow.
use insurance_analytics::config::{AppConfig, CONFIG_FILE};
use insurance_analytics::format::{format_for_chart, unit_label, ValueUnit, CURRENCY_SYMBOL};
use insurance_analytics::output::{self, report_rows};
use insurance_analytics::playlist::{Playlist, SystemClock};
use insurance_analytics::reports::{generate_summary, regroup};
use insurance_analytics::store::{DashboardSettings, JsonFileStore};
use insurance_analytics::util::{format_int, format_number};
use insurance_analytics::{apply_filters, extract_options, Column, FlatRecord, ReportType};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

// Loaded records and the active settings live for the whole session so the
// file is read once but reports can be regenerated after every filter change.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        settings: DashboardSettings::default(),
    })
});

struct AppState {
    data: Option<Vec<FlatRecord>>,
    settings: DashboardSettings,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Ask whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn filtered_records() -> Option<Vec<FlatRecord>> {
    let st = state();
    let data = st.data.as_ref()?;
    Some(apply_filters(data, &st.settings.selection))
}

fn handle_load(config: &AppConfig) {
    match insurance_analytics::loader::load_records(&config.data_path) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} records loaded)",
                format_int(report.total_rows),
                format_int(report.loaded_rows)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to read errors.",
                    format_int(report.parse_errors)
                );
            }
            if report.empty_rows > 0 {
                println!("Info: {} blank rows ignored.", format_int(report.empty_rows));
            }
            println!();
            state().data = Some(data);
        }
        Err(e) => {
            tracing::error!(path = %config.data_path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_generate_reports(config: &AppConfig) {
    let Some(data) = filtered_records() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let unit = state().settings.value_unit.code();

    println!("Generating reports for {} records...", format_int(data.len()));
    println!("(Amounts in {})\n", unit_label(unit));

    for report in ReportType::ALL {
        let groups = regroup(&data, report);
        let file = config.output_dir.join(format!("report_{}.csv", report.key()));
        if let Err(e) = output::write_csv(&file, &groups) {
            eprintln!("Write error: {}", e);
        }
        println!("{}\n", report.label());
        output::preview_table_rows(&report_rows(&groups, unit), config.preview_rows);
        println!("(Full table exported to {})\n", file.display());
    }

    let summary = generate_summary(&data);
    let file = config.output_dir.join("summary.json");
    if let Err(e) = output::write_json(&file, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats ({}):", file.display());
    println!(
        "{} policies across {} products and {} insurers",
        format_int(summary.total_policies),
        summary.total_products,
        summary.total_insurers
    );
    println!(
        "Net premium {}{}, revenue {}\n",
        CURRENCY_SYMBOL,
        format_number(summary.total_premium, 2),
        format_for_chart(summary.total_revenue, unit)
    );
}

fn save_settings(store: &mut JsonFileStore) {
    let mut st = state();
    if let Err(e) = st.settings.save(store) {
        eprintln!("Could not save settings: {}", e);
    }
}

fn handle_set_filters(store: &mut JsonFileStore) {
    let options = {
        let st = state();
        let Some(data) = st.data.as_ref() else {
            println!("Error: No data loaded. Please load the file first (option 1).\n");
            return;
        };
        extract_options(data)
    };

    println!("Enter comma-separated values per column (blank = no restriction).\n");
    for column in Column::ALL {
        let choices = options.values(column);
        if choices.is_empty() {
            continue;
        }
        let answer = prompt(&format!("{} [{}]: ", column, choices.join(", ")));
        let picked: Vec<String> = answer
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        *state().settings.selection.values_mut(column) = picked;
    }
    save_settings(store);
    println!();
}

fn handle_clear_filters(store: &mut JsonFileStore) {
    state().settings.selection = Default::default();
    save_settings(store);
    println!("Filters cleared.\n");
}

fn handle_presentation(config: &AppConfig) {
    let Some(data) = filtered_records() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let unit = state().settings.value_unit.code();

    let mut playlist = Playlist::new(
        SystemClock::new(),
        ReportType::ALL.to_vec(),
        config.slide_interval(),
    );
    playlist.play();
    for _ in 0..playlist.len() {
        if let Some(report) = playlist.current() {
            println!("== {} ==\n", report.label());
            output::preview_table_rows(&report_rows(&regroup(&data, report), unit), config.preview_rows);
        }
        std::thread::sleep(playlist.remaining());
        playlist.tick();
    }
    playlist.stop();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match AppConfig::load(CONFIG_FILE) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid {}: {}", CONFIG_FILE, e);
            std::process::exit(1);
        }
    };
    let mut store = JsonFileStore::new(&config.settings_dir);
    match DashboardSettings::load(&store) {
        Ok(Some(saved)) => state().settings = saved,
        Ok(None) => {
            let mut st = state();
            if let Some(unit) = ValueUnit::parse(&config.value_unit) {
                st.settings.value_unit = unit;
            }
            st.settings.department = config.department.clone();
        }
        Err(e) => tracing::warn!(error = %e, "could not read saved settings"),
    }

    loop {
        println!("Brokerage Analytics Dashboard");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Set Filters");
        println!("[4] Clear Filters");
        println!("[5] Presentation Mode");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_generate_reports(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_set_filters(&mut store),
            "4" => handle_clear_filters(&mut store),
            "5" => handle_presentation(&config),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}
