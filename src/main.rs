use std::process::ExitCode;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use wdbc_db_module::{FormatCatalog, Record, TableReader, WdbcConfig, WdbcResult};

const USAGE: &str = "\
Usage: wdbc-query <table> [row]
       wdbc-query --list

Environment:
  DBC_PATH          directory holding <table>.dbc files
  DBC_FORMAT_FILE   header with the format string declarations
  RUST_LOG          log filter (default: warn)";

/// Rows shown when no row is requested.
const PREVIEW_ROWS: usize = 3;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Non-padding fields as a JSON object.
fn record_json(record: &Record) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = record
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(i, v)| (i.to_string(), serde_json::Value::from(v.clone())))
        .collect();
    serde_json::Value::Object(fields)
}

fn load_catalog(cfg: &WdbcConfig) -> WdbcResult<FormatCatalog> {
    let catalog = FormatCatalog::from_path(&cfg.format_file)?;
    Ok(if cfg.default_overrides {
        catalog.with_default_overrides()
    } else {
        catalog
    })
}

/// Optional row argument. Anything that is not a row number is rejected
/// rather than falling back to the preview.
fn parse_row_arg(args: &[String]) -> Result<Option<usize>, String> {
    match args.get(1) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|e| format!("invalid row '{raw}': {e}")),
    }
}

fn run(args: &[String], row: Option<usize>) -> WdbcResult<serde_json::Value> {
    let cfg = WdbcConfig::from_env();
    let catalog = load_catalog(&cfg)?;

    if args[0] == "--list" {
        return Ok(json!({ "formats": catalog.list_available() }));
    }

    let name = args[0].as_str();
    let spec = catalog.resolve(name)?;
    let reader = TableReader::open(cfg.table_path(name), spec)?;

    let rows: Vec<serde_json::Value> = match row {
        Some(row) => match reader.record_at(row) {
            Some(rec) => vec![json!({ "row": row, "fields": record_json(rec) })],
            None => {
                tracing::warn!(row, total = reader.len(), "row out of range");
                Vec::new()
            }
        },
        None => reader
            .records()
            .iter()
            .take(PREVIEW_ROWS)
            .enumerate()
            .map(|(row, rec)| json!({ "row": row, "id": rec.id(), "fields": record_json(rec) }))
            .collect(),
    };

    Ok(json!({ "info": reader.info(), "records": rows }))
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "-h" || args[0] == "--help" {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let row = match parse_row_arg(&args) {
        Ok(row) => row,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, row) {
        Ok(out) => match serde_json::to_string_pretty(&out) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
