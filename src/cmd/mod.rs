pub mod classify;
pub mod generate;
pub mod schema;
pub mod validate;
pub mod xml;

use crate::core::{
    read_directory, read_ledger, DirectoryEntry, EntityResolver, Format, LedgerRow, RunConfig,
};
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Inputs shared by every command that runs the pipeline.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Trial balance by counterparty (CSV, or "-" for stdin)
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Shared counterparty registry (CSV)
    #[arg(short, long)]
    pub registry: Option<PathBuf>,

    /// Client-supplied counterparty directory (CSV); overrides the registry
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Run configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Formats to produce; overrides the config file
    #[arg(short, long = "format", value_enum)]
    pub formats: Vec<Format>,
}

/// Everything a pipeline run needs, read once per command.
pub struct RunInputs {
    pub config: RunConfig,
    pub rows: Vec<LedgerRow>,
    pub resolver: EntityResolver,
}

impl RunArgs {
    pub fn load(&self) -> anyhow::Result<RunInputs> {
        let mut config = load_config(self.config.as_deref())?;
        if !self.formats.is_empty() {
            config.formats = Some(self.formats.clone());
        }
        let rows = read_ledger_rows(&self.ledger)?;
        let registry = read_directory_file(self.registry.as_deref())?;
        let client = read_directory_file(self.directory.as_deref())?;
        Ok(RunInputs {
            config,
            rows,
            resolver: EntityResolver::new(registry, client),
        })
    }
}

/// Read the run configuration, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    match path {
        Some(path) => Ok(RunConfig::load(path)?),
        None => {
            log::warn!("no config file given, using defaults");
            Ok(RunConfig::default())
        }
    }
}

/// Read ledger rows from a file (or stdin with "-")
pub fn read_ledger_rows(path: &Path) -> anyhow::Result<Vec<LedgerRow>> {
    let rows = if path.as_os_str() == "-" {
        read_ledger(read_stdin()?.as_slice())?
    } else {
        read_ledger(BufReader::new(File::open(path)?))?
    };
    log::info!("read {} ledger rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_directory_file(path: Option<&Path>) -> anyhow::Result<Vec<DirectoryEntry>> {
    match path {
        Some(path) => Ok(read_directory(BufReader::new(File::open(path)?))?),
        None => Ok(Vec::new()),
    }
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}
