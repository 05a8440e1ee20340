//! StringCase transform CLI entry point.
//!
//! Reads newline-delimited JSON records, upper/lower-cases the configured
//! fields and writes the records to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stringcase_transform::config::FieldList;
use stringcase_transform::{Record, Schema, StringCaseConfig, StringCaseStage, Transformer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "stringcase-transform")]
#[command(
    author,
    version,
    about = "Upper/lower-case configured string fields of JSON records"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated fields to upper-case (overrides the config file)
    #[arg(long, env = "STRINGCASE_UPPER_FIELDS")]
    upper_fields: Option<String>,

    /// Comma-separated fields to lower-case (overrides the config file)
    #[arg(long, env = "STRINGCASE_LOWER_FIELDS")]
    lower_fields: Option<String>,

    /// Input schema file (YAML or JSON). When omitted, each record's schema
    /// is inferred at runtime and configured fields are not validated upfront.
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Newline-delimited JSON input file. Reads stdin if omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log and drop records that fail to transform instead of aborting
    #[arg(long)]
    skip_errors: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration against the schema and exit.
    #[arg(long)]
    validate: bool,
}

fn print_example_config() {
    let example = r#"# StringCase Transform Configuration Example

# Fields to upper-case. Either a comma-separated string or a list.
# Each field must be of type string (nullable string is allowed).
upperFields: "name, country_code"

# Fields to lower-case. A field listed in both is upper-cased.
lowerFields:
  - city
  - email
"#;
    println!("{}", example);
}

/// Deserialize a YAML or JSON file, chosen by extension.
fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Transform one input line into one output JSON object.
fn process_line(
    transformer: &impl Transformer,
    schema: Option<&Arc<Schema>>,
    line: &str,
) -> Result<JsonValue> {
    let json: JsonValue = serde_json::from_str(line).context("Invalid JSON record")?;

    let schema = match schema {
        Some(schema) => schema.clone(),
        None => {
            let object = json
                .as_object()
                .context("Record is not a JSON object")?;
            Arc::new(Schema::infer(object)?)
        }
    };

    let record = Record::from_json(schema, &json)?;
    let output = transformer.transform(&record)?;
    Ok(output.to_json())
}

/// Replace configured field lists with the ones given on the command line.
fn apply_overrides(config: &mut StringCaseConfig, upper: Option<String>, lower: Option<String>) {
    if let Some(upper) = upper {
        config.upper_fields = Some(FieldList::Delimited(upper));
    }
    if let Some(lower) = lower {
        config.lower_fields = Some(FieldList::Delimited(lower));
    }
}

/// Transform every non-blank input line, writing one JSON object per line.
///
/// Returns the number of records written and dropped. Records are only
/// dropped when `skip_errors` is set; otherwise the first failure aborts.
fn run(
    transformer: &impl Transformer,
    schema: Option<&Arc<Schema>>,
    reader: impl BufRead,
    mut out: impl Write,
    skip_errors: bool,
) -> Result<(u64, u64)> {
    let mut written: u64 = 0;
    let mut dropped: u64 = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read input line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        match process_line(transformer, schema, &line) {
            Ok(output) => {
                serde_json::to_writer(&mut out, &output).context("Failed to write record")?;
                out.write_all(b"\n").context("Failed to write record")?;
                written += 1;
            }
            Err(e) if skip_errors => {
                warn!(
                    line = line_no,
                    transformer = transformer.name(),
                    error = %format!("{:#}", e),
                    "Dropping record that failed to transform"
                );
                dropped += 1;
            }
            Err(e) => {
                return Err(e.context(format!("Record on line {} failed to transform", line_no)));
            }
        }
    }

    Ok((written, dropped))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }

    // Print example config if requested
    if args.example_config {
        print_example_config();
        return Ok(());
    }

    // Load configuration
    let mut config: StringCaseConfig = match &args.config {
        Some(path) => load_file(path)?,
        None => StringCaseConfig::default(),
    };

    // Override field lists from CLI
    apply_overrides(&mut config, args.upper_fields, args.lower_fields);

    let schema: Option<Schema> = args.schema.as_deref().map(load_file::<Schema>).transpose()?;

    let stage = StringCaseStage::new(config);
    let output_schema = stage
        .configure(schema.as_ref())
        .context("Configuration does not match the input schema")?;

    // Validate only if requested
    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let transformer = stage.initialize();
    let schema = output_schema.map(Arc::new);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("Failed to open input file: {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    info!(
        input = ?args.input,
        schema_known = schema.is_some(),
        "Transforming records"
    );

    let (written, dropped) = run(
        &transformer,
        schema.as_ref(),
        reader,
        &mut out,
        args.skip_errors,
    )?;

    out.flush().context("Failed to flush output")?;

    info!(records = written, dropped, "Transform complete");

    Ok(())
}
