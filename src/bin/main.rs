//! jsonview CLI - Compile JSON Schemas to typed views and partial indexes
//!
//! Usage:
//!   jsonview compile --schema <file.json> --table <name> --document <col> [options]
//!   jsonview leaves <file.json>
//!   jsonview functions [--encoding json|jsonb|all] [--postgis]
//!
//! Examples:
//!   jsonview compile --schema form.json --table forms --document data \
//!       --column id --column tenant_id --where tenant_id=1 --view forms_v
//!   jsonview leaves form.json
//!   jsonview functions --encoding all --postgis

use clap::{Parser, Subcommand, ValueEnum};
use jsonview::compile::{compile, BaseQuery, DocumentColumn};
use jsonview::config::Settings;
use jsonview::functions::install_script;
use jsonview::schema::{walk_value, DatePart, Encoding, Property};
use jsonview::sql::expr::{col, lit_int, lit_str, Expr, ExprExt};
use jsonview::sql::TableRef;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonview")]
#[command(about = "jsonview - Compile JSON Schemas of document columns into typed SQL views")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a schema to view and index DDL
    Compile(CompileArgs),

    /// Print the leaves of a schema as JSON
    Leaves {
        /// Path to the JSON Schema file
        file: PathBuf,
    },

    /// Print the extraction function install script
    Functions {
        /// Encoding to install functions for
        #[arg(short, long, default_value = "all")]
        encoding: EncodingArg,

        /// Include the PostGIS geopoint functions
        #[arg(long)]
        postgis: bool,
    },
}

#[derive(clap::Args)]
struct CompileArgs {
    /// Path to the JSON Schema file
    #[arg(short, long)]
    schema: PathBuf,

    /// Base table holding the documents
    #[arg(short, long)]
    table: String,

    /// Database schema of the base table
    #[arg(long)]
    schema_name: Option<String>,

    /// Document column
    #[arg(short, long)]
    document: String,

    /// Storage type of the document column (defaults to the settings file)
    #[arg(short, long)]
    encoding: Option<Encoding>,

    /// Base column to pass through (repeatable)
    #[arg(short, long = "column")]
    columns: Vec<String>,

    /// Row filter equality `column=value` (repeatable, ANDed)
    #[arg(short, long = "where", value_parser = parse_condition)]
    conditions: Vec<(String, String)>,

    /// View name (defaults to `<table>_view`)
    #[arg(long)]
    view: Option<String>,

    /// Skip index generation
    #[arg(long)]
    no_indexes: bool,

    /// Replace existing views
    #[arg(long)]
    replace: bool,

    /// Drop indexes with the derived name before creating them
    #[arg(long)]
    drop_existing_indexes: bool,

    /// Materialize exploded array views
    #[arg(long)]
    materialize: bool,

    /// Calendar part to expose for temporal leaves (repeatable)
    #[arg(long = "date-part")]
    date_parts: Vec<DatePart>,

    /// Settings file (overrides the default lookup)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum EncodingArg {
    Json,
    Jsonb,
    All,
}

impl EncodingArg {
    fn encodings(&self) -> Vec<Encoding> {
        match self {
            EncodingArg::Json => vec![Encoding::Json],
            EncodingArg::Jsonb => vec![Encoding::Jsonb],
            EncodingArg::All => Encoding::ALL.to_vec(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile(args) => cmd_compile(args),
        Commands::Leaves { file } => cmd_leaves(file),
        Commands::Functions { encoding, postgis } => cmd_functions(encoding, postgis),
    }
}

fn cmd_compile(args: CompileArgs) -> ExitCode {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s.compile,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let schema = match read_schema(&args.schema) {
        Some(v) => v,
        None => return ExitCode::FAILURE,
    };

    // Flags only ever switch options on; the settings file supplies the rest.
    let mut options = settings.to_options();
    if args.no_indexes {
        options.indexes = false;
    }
    options.replace |= args.replace;
    options.drop_existing_indexes |= args.drop_existing_indexes;
    options.use_materialized_view |= args.materialize;
    if !args.date_parts.is_empty() {
        options.extract_date_parts = args.date_parts.clone();
    }

    let encoding = args.encoding.unwrap_or(settings.encoding);
    let mut table = TableRef::new(&args.table);
    if let Some(schema_name) = &args.schema_name {
        table = table.with_schema(schema_name);
    }
    let mut base = BaseQuery::new(table, DocumentColumn::new(args.document.clone(), encoding))
        .columns(args.columns.iter().cloned());
    for (column, value) in &args.conditions {
        base = base.filter(col(column).eq(condition_value(value)));
    }

    let view = args
        .view
        .clone()
        .unwrap_or_else(|| format!("{}_view", args.table));

    match compile(&view, &base, &schema, &options) {
        Ok(output) => {
            println!("{}", output.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_leaves(file: PathBuf) -> ExitCode {
    let schema = match read_schema(&file) {
        Some(v) => v,
        None => return ExitCode::FAILURE,
    };

    let properties = match walk_value(&schema) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let leaves: Vec<_> = properties
        .iter()
        .filter_map(|property| match property {
            Property::Leaf(leaf) => Some(leaf),
            _ => None,
        })
        .collect();

    match serde_json::to_string_pretty(&leaves) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing leaves: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_functions(encoding: EncodingArg, postgis: bool) -> ExitCode {
    println!("{}", install_script(&encoding.encodings(), postgis));
    ExitCode::SUCCESS
}

fn read_schema(path: &Path) -> Option<Value> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&source) {
        Ok(v) => Some(v),
        Err(e) => {
            eprintln!("Error parsing JSON in '{}': {}", path.display(), e);
            None
        }
    }
}

fn parse_condition(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{s}'")),
    }
}

/// Integer literal when `value` parses as one, string literal otherwise.
fn condition_value(value: &str) -> Expr {
    match value.parse::<i64>() {
        Ok(n) => lit_int(n),
        Err(_) => lit_str(value),
    }
}
