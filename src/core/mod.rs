pub mod aggregate;
pub mod classifier;
pub mod collect;
pub mod columns;
pub mod config;
pub mod directory;
pub mod emit;
pub mod entity;
pub mod format;
pub mod institutions;
pub mod issues;
pub mod ledger;
pub mod pipeline;
pub mod reconcile;
pub mod record;
pub mod rules;
pub mod sanitize;
pub mod text;
pub mod validate;
pub mod withholding;

// Flat public surface for the commands.
pub use classifier::AccountClassifier;
pub use columns::CsvField;
pub use config::RunConfig;
pub use directory::{read_directory, DirectoryColumns};
pub use emit::{read_tabular, render_xml, to_latin1, write_tabular, Envelope};
pub use entity::{DirectoryEntry, EntityResolver};
pub use format::Format;
pub use issues::StructuralIssue;
pub use ledger::{read_ledger, LedgerColumns, LedgerRow};
pub use pipeline::{prepare, FormatReport, Pipeline, RunReport};
pub use reconcile::{reconcile, Reconciliation};
pub use validate::Diagnostic;
