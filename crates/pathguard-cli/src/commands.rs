use std::fs;

use anyhow::Context;
use colored::Colorize;
use pathguard_store::{Store, StoreConfig, Value};
use pathguard_types::Path;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = execute(&cli)?;
    println!("{output}");
    Ok(())
}

/// Run a command and return what it prints.
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    let store = load_store(cli)?;
    match &cli.command {
        Command::Read(args) => cmd_read(&store, args, cli.format),
        Command::Write(args) => cmd_write(&store, args, cli.format),
        Command::Entries => cmd_entries(&store, cli.format),
        Command::Check(args) => cmd_check(&store, args, cli.format),
    }
}

fn load_store(cli: &Cli) -> anyhow::Result<Store> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    let document = match &cli.data {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?
        }
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    let store = Store::from_json(document, &config)?;
    tracing::debug!(fields = store.len(), "store loaded");
    Ok(store)
}

fn cmd_read(store: &Store, args: &ReadArgs, format: OutputFormat) -> anyhow::Result<String> {
    let path = Path::parse(&args.path);
    let value = store
        .read_path(&path)
        .with_context(|| format!("cannot read {}", path))?;
    Ok(render(&value, format))
}

fn cmd_write(store: &Store, args: &WriteArgs, format: OutputFormat) -> anyhow::Result<String> {
    let path = Path::parse(&args.path);
    let value = parse_value(&args.value);
    let written = store
        .write_path(&path, value)
        .with_context(|| format!("cannot write {}", path))?;
    let snapshot = Value::Store(store.clone());

    Ok(match format {
        OutputFormat::Json => pretty(&serde_json::json!({
            "path": path.to_string(),
            "written": written.to_json(),
            "store": snapshot.to_json(),
        })),
        OutputFormat::Text => format!(
            "{} Wrote {} = {}\n{}",
            "✓".green().bold(),
            path.to_string().yellow(),
            render(&written, format),
            pretty(&snapshot.to_json()),
        ),
    })
}

fn cmd_entries(store: &Store, format: OutputFormat) -> anyhow::Result<String> {
    let entries = store.entries();
    Ok(match format {
        OutputFormat::Json => pretty(&Value::Object(entries).to_json()),
        OutputFormat::Text if entries.is_empty() => "No readable fields.".dimmed().to_string(),
        OutputFormat::Text => entries
            .iter()
            .map(|(name, value)| format!("{}  {}", name.bold(), compact(value)))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn cmd_check(store: &Store, args: &CheckArgs, format: OutputFormat) -> anyhow::Result<String> {
    let level = store.level_of(&args.field);
    let read = store.allowed_to_read(&args.field);
    let write = store.allowed_to_write(&args.field);
    Ok(match format {
        OutputFormat::Json => pretty(&serde_json::json!({
            "field": args.field,
            "level": level.to_string(),
            "read": read,
            "write": write,
        })),
        OutputFormat::Text => format!(
            "{} ({})\n  read:  {}\n  write: {}",
            args.field.bold(),
            level.to_string().cyan(),
            mark(read),
            mark(write),
        ),
    })
}

/// Parse CLI input as JSON, falling back to a plain string.
fn parse_value(input: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(input)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(input))
}

fn render(value: &Value, format: OutputFormat) -> String {
    match (value, format) {
        (_, OutputFormat::Json) => pretty(&value.to_json()),
        (Value::Missing, OutputFormat::Text) => "(missing)".dimmed().to_string(),
        (Value::String(s), OutputFormat::Text) => s.clone(),
        (_, OutputFormat::Text) => pretty(&value.to_json()),
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::Store(_) => "<store>".cyan().to_string(),
        Value::Deferred(_) => "<deferred>".cyan().to_string(),
        other => other.to_json().to_string(),
    }
}

fn pretty(json: &serde_json::Value) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}

fn mark(allowed: bool) -> colored::ColoredString {
    if allowed {
        "✓".green()
    } else {
        "✗".red()
    }
}
