//! Inspect and re-render dbdoc update documents.
//!
//! Reads a JSON `"doc"` document, applies it to an empty record, prints a
//! summary of the pending updates, and renders the record back as JSON.
//!
//! Usage:
//!   dbdoc-inspect update.json
//!   dbdoc-inspect update.json --schema message.schema.json --grouped
//!   cat update.json | dbdoc-inspect -

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use dbdoc::model::SHARD_FIELD;
use dbdoc::{FieldSchema, Record, TableDef, UNode};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dbdoc-inspect")]
#[command(about = "Inspect and re-render dbdoc update documents")]
struct Args {
    /// Path to the JSON document, or `-` for stdin
    input: PathBuf,

    /// Path to a JSON table schema document
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Nest fields inside their group fields (requires --schema)
    #[arg(short, long)]
    grouped: bool,

    /// Print compact instead of indented JSON
    #[arg(long)]
    compact: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if args.grouped && args.schema.is_none() {
        bail!("--grouped requires --schema");
    }

    let schema = args.schema.as_deref().map(load_schema).transpose()?;

    let text = read_input(&args.input)?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", args.input.display()))?;
    let doc = UNode::from_json(&json).context("not a document tree")?;
    debug!(root = %doc, "read document");

    let mut record = Record::new();
    record.parse(&doc).context("failed to apply document")?;
    info!("{record}");

    print_summary(&record, schema.as_ref());

    let rendered = match &schema {
        Some(table) if args.grouped => record
            .to_grouped_doc(table)
            .context("failed to group document")?,
        _ => record.to_doc(),
    };
    if args.compact {
        println!("{}", rendered.to_json_string());
    } else {
        println!("{}", rendered.to_json_pretty());
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_schema(path: &Path) -> Result<TableDef> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let table = TableDef::from_json_str(&text)
        .with_context(|| format!("invalid schema {}", path.display()))?;
    info!(table = table.name(), fields = table.len(), "loaded schema");
    Ok(table)
}

fn print_summary(record: &Record, schema: Option<&TableDef>) {
    eprintln!("=== Record ===");
    eprintln!("ID: {}", record.object_id().unwrap_or("-"));
    eprintln!("Table: {}", record.table_name().unwrap_or("-"));
    eprintln!("Deleted: {}", record.is_deleted());
    if let Some(shard) = record.shard_name() {
        eprintln!("Shard: {shard}");
    }

    let mut names: Vec<String> = record.updated_field_names().into_iter().collect();
    names.sort_unstable();
    eprintln!("\n=== Updated fields ({}) ===", names.len());
    for name in &names {
        let (adds, removes) = pending_counts(record, name);
        let kind = match schema {
            Some(table) if table.is_scalar_field(name) => " scalar",
            Some(_) => " multi-valued",
            None => "",
        };
        eprintln!("  {name}{kind}: +{adds} -{removes}");
    }
    if let Some(table) = schema {
        eprintln!(
            "Scalar fields: {}",
            record.updated_scalar_field_names(table).len()
        );
    }
    eprintln!();
}

/// Number of values to add and to remove for an updated field.
fn pending_counts(record: &Record, name: &str) -> (usize, usize) {
    let adds = if name == SHARD_FIELD {
        usize::from(record.shard_name().is_some())
    } else {
        record.field_values(name).ok().flatten().map_or(0, <[String]>::len)
    };
    let removes = record.remove_values(name).map_or(0, |values| values.len());
    (adds, removes)
}
