mod cmd;
mod core;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "exogena", version, about = "Colombian exogenous information from a trial balance by counterparty")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the tabular and XML documents of every format
    Generate(cmd::generate::GenerateCommand),
    /// Report validation errors, warnings and skipped rows
    Validate(cmd::validate::ValidateCommand),
    /// Build the XML envelope from an edited tabular document
    Xml(cmd::xml::XmlCommand),
    /// Show the concept each ledger row gets per format
    Classify(cmd::classify::ClassifyCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(c) => c.exec(),
        Command::Validate(c) => c.exec(),
        Command::Xml(c) => c.exec(),
        Command::Classify(c) => c.exec(),
        Command::Schema(c) => c.exec(),
    }
}
