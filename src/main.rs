use crate::editor::RowEditor;
use crate::store::PurchaseStore;
use crate::tui::Tab;

use clap::{arg, ArgMatches, Command};
use colored::Colorize;
use eyre::WrapErr;
use serde::Deserialize;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

mod editor;
mod error;
mod input;
mod purchase;
mod store;
mod summary;
mod tui;

const APP_NAME: &str = "dca_rs";

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    purchases_file: String,
    start_tab: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            purchases_file: String::new(),
            start_tab: "calculator".to_string(),
        }
    }
}

fn cli() -> Command {
    Command::new(APP_NAME)
        .about("A dollar cost averaging calculator")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("tui")
                .about("Open the interactive calculator")
                .arg(
                    arg!([FILE] "JSON file with purchases to start from")
                        .required(false)
                        .default_value(""),
                )
                .arg(arg!(--tab <TAB> "Tab to open first: home, calculator or about")),
        )
        .subcommand(
            Command::new("summary")
                .about("Print the purchases with their total units, average price and amount")
                .arg(
                    arg!([FILE] "JSON file with purchases")
                        .required(false)
                        .default_value(""),
                ),
        )
}

/// Where log lines go for a subcommand.
#[derive(Debug, PartialEq)]
enum LogDestination {
    Stderr,
    File(PathBuf),
}

// the TUI owns the terminal, so it logs to a file
fn log_destination(subcommand: Option<&str>) -> LogDestination {
    match subcommand {
        Some("tui") => LogDestination::File(std::env::temp_dir().join(format!("{APP_NAME}.log"))),
        _ => LogDestination::Stderr,
    }
}

fn init_logging(destination: &LogDestination) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, ansi) = match destination {
        LogDestination::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogDestination::File(path) => match File::create(path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
            // never fall back to the terminal while the TUI is drawing
            Err(_) => (BoxMakeWriter::new(std::io::sink), false),
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

// argument first, then the config file
fn resolve_file(matches: &ArgMatches, cfg: &Config) -> Option<String> {
    let mut filename = String::new();
    if let Ok(Some(f)) = matches.try_get_one::<String>("FILE") {
        filename = f.to_string();
    }
    if filename.is_empty() {
        filename.clone_from(&cfg.purchases_file);
    }
    if filename.is_empty() {
        None
    } else {
        Some(filename)
    }
}

/// Load purchases from `filename` and check every field once.
fn load_purchases(filename: &str) -> eyre::Result<(PurchaseStore, RowEditor)> {
    let drafts = purchase::from_file(filename)
        .wrap_err_with(|| format!("Could not load purchases from {filename}"))?;
    let store = PurchaseStore::from_drafts(drafts);
    let mut editor = RowEditor::new();
    for entry in store.entries() {
        editor.check_entry(entry);
    }
    info!(file = filename, purchases = store.len(), "purchases loaded");
    Ok((store, editor))
}

fn start_tab(matches: &ArgMatches, cfg: &Config) -> Tab {
    let requested = matches
        .get_one::<String>("tab")
        .map(String::as_str)
        .unwrap_or(cfg.start_tab.as_str());
    Tab::parse(requested).unwrap_or_else(|| {
        warn!(tab = requested, "unknown tab, opening the calculator");
        Tab::Calculator
    })
}

fn run_summary(filename: &str) -> eyre::Result<()> {
    let (store, editor) = load_purchases(filename)?;
    summary::print(store.entries(), &store.summary());

    if !editor.has_errors() {
        return Ok(());
    }
    // soft validation: report, but still count the rows
    for (i, entry) in store.entries().iter().enumerate() {
        for field in [purchase::Field::Units, purchase::Field::Price] {
            if let Some(msg) = editor.error(entry.id(), field) {
                debug!(row = i + 1, %field, "invalid purchase field");
                eprintln!("{} row {}: {}", "warning:".yellow().bold(), i + 1, msg);
            }
        }
    }
    Ok(())
}

fn main() -> eyre::Result<()> {
    let matches = cli().get_matches();
    init_logging(&log_destination(matches.subcommand_name()));

    let cfg: Config = confy::load(APP_NAME, "config").unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::default()
    });

    match matches.subcommand() {
        Some(("config", _)) => {
            let path = confy::get_configuration_file_path(APP_NAME, "config")?;
            println!("Your config file is located here: \n{}", path.display());
        }
        Some(("tui", matches)) => {
            let (store, editor) = match resolve_file(matches, &cfg) {
                Some(filename) => load_purchases(&filename)?,
                None => (PurchaseStore::new(), RowEditor::new()),
            };
            let tab = start_tab(matches, &cfg);
            info!(?tab, purchases = store.len(), "starting tui");
            tui::run_tui(store, editor, tab)?;
        }
        Some(("summary", matches)) => match resolve_file(matches, &cfg) {
            Some(filename) => run_summary(&filename)?,
            None => cli().print_help()?,
        },
        _ => (),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli() {
        let matches = cli().get_matches_from(vec![APP_NAME, "summary", "example_data.json"]);
        assert_eq!(matches.subcommand_name(), Some("summary"));
    }

    #[test]
    fn test_tui_logs_to_a_file() {
        let matches = cli().get_matches_from(vec![APP_NAME, "tui"]);
        match log_destination(matches.subcommand_name()) {
            LogDestination::File(path) => {
                assert_eq!(path.file_name().unwrap(), "dca_rs.log");
            }
            LogDestination::Stderr => panic!("tui must not log to the terminal"),
        }

        let matches = cli().get_matches_from(vec![APP_NAME, "summary", "example_data.json"]);
        assert_eq!(
            log_destination(matches.subcommand_name()),
            LogDestination::Stderr
        );
        assert_eq!(log_destination(Some("config")), LogDestination::Stderr);
    }

    #[test]
    fn test_file_argument_wins_over_config() {
        let cfg = Config {
            purchases_file: "from_config.json".to_string(),
            ..Config::default()
        };
        let matches = cli().get_matches_from(vec![APP_NAME, "tui", "from_arg.json"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(resolve_file(sub, &cfg).as_deref(), Some("from_arg.json"));

        let matches = cli().get_matches_from(vec![APP_NAME, "tui"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(resolve_file(sub, &cfg).as_deref(), Some("from_config.json"));
        assert_eq!(resolve_file(sub, &Config::default()), None);
    }

    #[test]
    fn test_start_tab() {
        let cfg = Config::default();
        let matches = cli().get_matches_from(vec![APP_NAME, "tui", "--tab", "about"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(start_tab(sub, &cfg), Tab::About);

        let matches = cli().get_matches_from(vec![APP_NAME, "tui", "--tab", "bogus"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(start_tab(sub, &cfg), Tab::Calculator);

        let cfg = Config {
            start_tab: "home".to_string(),
            ..Config::default()
        };
        let matches = cli().get_matches_from(vec![APP_NAME, "tui"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(start_tab(sub, &cfg), Tab::Home);
    }

    #[test]
    fn test_load_example_data() {
        let (store, editor) = load_purchases("example_data.json").unwrap();
        assert_eq!(store.len(), 3);
        let summary = store.summary();
        assert_eq!(summary.total_units, 17.5);
        assert_eq!(summary.total_amount, 800.0);
        assert!(editor.error(store.ids()[2], purchase::Field::Units).is_none());
    }
}
