//! XML command - build the XML envelope from an edited tabular document

use crate::cmd::load_config;
use crate::core::{prepare, read_tabular, render_xml, to_latin1, Envelope, Format};
use clap::Args;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct XmlCommand {
    /// Tabular document (CSV) written by `generate`
    #[arg(short, long)]
    records: PathBuf,

    /// Format of the document
    #[arg(short, long, value_enum)]
    format: Format,

    /// Run configuration (JSON) with the filer and envelope number
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output XML file
    #[arg(short, long)]
    out: PathBuf,

    /// Write the XML even when validation finds errors
    #[arg(long)]
    force: bool,
}

impl XmlCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let config = load_config(self.config.as_deref())?;
        let def = self.format.def();
        let records = read_tabular(BufReader::new(File::open(&self.records)?), def)?;
        let report = prepare(self.format, records, Vec::new(), &config.filer);

        for d in &report.diagnostics {
            eprintln!("{} {} [{}] {}", d.severity, d.location, d.field, d.message);
        }
        if !report.is_ready() && !self.force {
            eprintln!(
                "F{}: {} error(s), XML not written (use --force to write it anyway)",
                self.format,
                report.errors()
            );
            std::process::exit(1);
        }

        let xml = render_xml(
            def,
            &report.records,
            &Envelope {
                year: config.year,
                number: config.first_envelope,
                submission_date: config.submission_date(),
                filer: &config.filer,
            },
        );
        fs::write(&self.out, to_latin1(&xml))?;
        println!(
            "F{}: {} records written to {}",
            self.format,
            report.records.len(),
            self.out.display()
        );
        Ok(())
    }
}
