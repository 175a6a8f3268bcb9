use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Non-fatal conditions found while collecting a format. They are reported
/// alongside the generated records and never block output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum StructuralIssue {
    /// A row that must name a counterparty has no id.
    MissingCounterparty { line: usize, account: String },
    /// Withholding was recorded for an id with no payment to attach it to.
    ZeroPaymentWithholding {
        id: String,
        #[schemars(with = "f64")]
        dropped: Decimal,
    },
    /// A legal-entity-only concept was reported for a natural person and
    /// moved to the catch-all concept.
    ReclassifiedToOther { id: String, concept: String },
    /// Row matched no rule of the format and was left out.
    Unclassified { line: usize, account: String },
}

impl std::fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralIssue::MissingCounterparty { line, account } => {
                write!(f, "line {line}: account {account} has no counterparty id")
            }
            StructuralIssue::ZeroPaymentWithholding { id, dropped } => {
                write!(f, "{id}: withholding {dropped} has no payment to attach to")
            }
            StructuralIssue::ReclassifiedToOther { id, concept } => {
                write!(f, "{id}: concept {concept} is for legal entities only, reported as other expenses")
            }
            StructuralIssue::Unclassified { line, account } => {
                write!(f, "line {line}: account {account} matched no concept")
            }
        }
    }
}
