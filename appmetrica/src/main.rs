//! appmetrica - encode and upload AppMetrica event imports
//!
//! Reads event records from a JSON Lines file and either writes the CSV import
//! body locally or streams it to the logs import endpoint.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/appmetrica/config.toml (~/.config/appmetrica/config.toml)
//! - Logs: $XDG_STATE_HOME/appmetrica/appmetrica.log (~/.local/state/appmetrica/appmetrica.log)

use anyhow::{bail, Context, Result};
use appmetrica_core::importer::Column;
use appmetrica_core::{Config, EventImporter, IdentifierMode, SyncImportClient};
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "appmetrica")]
#[command(about = "Encode and upload AppMetrica event imports")]
#[command(version)]
struct Args {
    /// Write logs to the state directory
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the CSV import body for a JSON Lines file
    Encode {
        #[command(flatten)]
        import: ImportArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a JSON Lines file to the logs import endpoint
    Import {
        #[command(flatten)]
        import: ImportArgs,
    },

    /// List the optional columns the importer recognizes
    Columns,
}

#[derive(ClapArgs)]
struct ImportArgs {
    /// JSON Lines file with one event record per line
    #[arg(short, long)]
    input: PathBuf,

    /// Identifier keying each row: device or profile (default: from config)
    #[arg(long, value_name = "MODE")]
    identifier: Option<IdentifierMode>,

    /// Comma-separated optional columns (default: from config)
    #[arg(short, long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Bytes per output chunk (default: from config)
    #[arg(long)]
    chunk_size: Option<usize>,
}

/// Settings resolved from config and command line
struct ImportPlan {
    identifier: IdentifierMode,
    columns: Vec<String>,
    chunk_size: usize,
}

impl ImportPlan {
    fn resolve(config: &Config, args: &ImportArgs) -> Result<Self> {
        let identifier = args.identifier.unwrap_or(config.import.identifier);
        let columns = args
            .columns
            .clone()
            .unwrap_or_else(|| config.import.columns.clone());
        let chunk_size = args.chunk_size.unwrap_or(config.import.chunk_size);

        if chunk_size == 0 {
            bail!("chunk size must be at least 1");
        }

        Ok(Self {
            identifier,
            columns,
            chunk_size,
        })
    }

    fn build_importer(&self, input: &Path) -> Result<EventImporter> {
        let events = appmetrica_core::ingest::load_events(input)
            .with_context(|| format!("failed to load events from {}", input.display()))?;

        let mut importer = EventImporter::new(self.identifier, &self.columns);

        let dropped: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|name| Column::from_name(name).is_none())
            .collect();
        if !dropped.is_empty() {
            eprintln!("Ignoring unknown column(s): {}", dropped.join(", "));
        }

        importer.enqueue_many(events);
        Ok(importer)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        let guard = appmetrica_core::logging::init(&config.logging)
            .context("failed to initialize logging")?;
        Some(guard)
    } else {
        None
    };

    match args.command {
        Command::Encode { import, output } => cmd_encode(&config, &import, output),
        Command::Import { import } => cmd_import(&config, &import),
        Command::Columns => cmd_columns(),
    }
}

fn cmd_encode(config: &Config, args: &ImportArgs, output: Option<PathBuf>) -> Result<()> {
    let plan = ImportPlan::resolve(config, args)?;
    let importer = plan.build_importer(&args.input)?;
    let events = importer.pending();

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut bytes = 0;
    for chunk in importer.into_chunks(plan.chunk_size) {
        writer.write_all(&chunk).context("failed to write CSV")?;
        bytes += chunk.len();
    }
    writer.flush().context("failed to write CSV")?;

    tracing::info!(events, bytes, "Encoded event import");

    if let Some(path) = output {
        println!("Wrote {} event(s), {} bytes to {}", events, bytes, path.display());
    }

    Ok(())
}

fn cmd_import(config: &Config, args: &ImportArgs) -> Result<()> {
    let plan = ImportPlan::resolve(config, args)?;
    let importer = plan.build_importer(&args.input)?;

    if importer.pending() == 0 {
        println!("No events in {}", args.input.display());
        return Ok(());
    }

    let client =
        SyncImportClient::new(config.api.clone()).context("invalid [api] configuration")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Uploading {} event(s) to {}",
        importer.pending(),
        client.import_url()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.import_events(importer, plan.chunk_size);
    spinner.finish_and_clear();

    let events = result.context("event import failed")?;
    println!("Imported {} event(s)", events);

    Ok(())
}

fn cmd_columns() -> Result<()> {
    for column in Column::ALL {
        if column.is_supported() {
            println!("{}", column);
        } else {
            println!("{} (not supported, left empty)", column);
        }
    }
    Ok(())
}
