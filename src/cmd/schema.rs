//! Schema command - print expected input formats

use crate::core::{CsvField, DirectoryColumns, LedgerColumns, RunConfig};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// What to print
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema of the run configuration
    JsonSchema,
    /// Ledger CSV column descriptions and accepted header aliases
    LedgerFields,
    /// Ledger CSV header row with column names
    LedgerHeader,
    /// Directory CSV column descriptions and accepted header aliases
    DirectoryFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(RunConfig);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::LedgerFields => {
                print_fields("Ledger CSV Format", LedgerColumns::csv_schema());
                println!("Credit balances are negative. Amounts may use $ and , separators.");
            }
            SchemaFormat::LedgerHeader => {
                let names: Vec<&str> = LedgerColumns::csv_schema().iter().map(|f| f.name).collect();
                println!("{}", names.join(","));
            }
            SchemaFormat::DirectoryFields => {
                print_fields("Directory CSV Format", DirectoryColumns::csv_schema());
            }
        }
        Ok(())
    }
}

fn print_fields(title: &str, fields: &[CsvField]) {
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("{:20} ({:8})  {}", field.name, req, field.description);
        if !field.aliases.is_empty() {
            println!("{:32}also: {}", "", field.aliases.join(", "));
        }
    }
    println!();
}
