//! E2E tests for the generate, validate, xml, classify and schema commands

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn exogena(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn out_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("exogena-e2e-{}", name));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn generate(out: &PathBuf) -> Output {
    exogena(&[
        "generate",
        "-l",
        "tests/data/ledger.csv",
        "-d",
        "tests/data/directory.csv",
        "-c",
        "tests/data/config.json",
        "-o",
        out.to_str().unwrap(),
    ])
}

/// Every format is written, with a summary and reconciliation table
#[test]
fn generate_writes_all_formats() {
    let out = out_dir("all");
    let output = generate(&out);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Written"));
    assert!(stdout.contains("RECONCILIATION"));

    for code in ["1001", "1003", "1005", "1006", "1007", "1008", "1009", "1012", "2276"] {
        assert!(out.join(format!("F{}.csv", code)).exists(), "F{} csv missing", code);
        assert!(out.join(format!("F{}.xml", code)).exists(), "F{} xml missing", code);
    }
}

/// Payroll goes to 2276 and small payments are folded into minor amounts
#[test]
fn generate_payroll_and_minor_amounts() {
    let out = out_dir("payroll");
    let output = generate(&out);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let f1001 = fs::read_to_string(out.join("F1001.csv")).unwrap();
    assert!(f1001.contains("900123456"));
    assert!(f1001.contains("222222222"));
    assert!(f1001.contains("CUANTIAS MENORES"));
    assert!(!f1001.contains("13551234"));
    assert!(!f1001.contains("800555111"));

    let f2276 = fs::read_to_string(out.join("F2276.csv")).unwrap();
    assert!(f2276.contains("13551234"));
    assert!(f2276.contains("5000000"));
    assert!(f2276.contains("350000"));

    let f1012 = fs::read_to_string(out.join("F1012.csv")).unwrap();
    assert!(f1012.contains("890903938"));
}

/// XML envelope header and Latin-1 declaration
#[test]
fn generate_xml_envelope() {
    let out = out_dir("xml-envelope");
    let output = generate(&out);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let bytes = fs::read(out.join("F1009.xml")).unwrap();
    let xml = String::from_utf8_lossy(&bytes);
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#));
    assert!(xml.contains(r#"<mas xmlns="http://www.dian.gov.co/muisca/mas">"#));
    assert!(xml.contains("<Formato>1009</Formato>"));
    assert!(xml.contains("<FecEnvio>2026-03-31</FecEnvio>"));
    assert!(xml.contains("<NumNit>900999999</NumNit>"));
    assert!(xml.contains("ACME S.A.S."));
    assert!(xml.contains("CL 100 # 10-10"));
}

/// Two runs with the same inputs produce identical bytes
#[test]
fn generate_is_repeatable() {
    let first = out_dir("repeat-1");
    let second = out_dir("repeat-2");
    assert!(generate(&first).status.success());
    assert!(generate(&second).status.success());

    for code in ["1001", "1007", "1009", "2276"] {
        let name = format!("F{}.xml", code);
        assert_eq!(
            fs::read(first.join(&name)).unwrap(),
            fs::read(second.join(&name)).unwrap(),
            "{} differs between runs",
            name
        );
    }
}

/// A blocked format is not written unless forced
#[test]
fn generate_blocked_format() {
    let out = out_dir("blocked");
    let output = exogena(&[
        "generate",
        "-l",
        "tests/data/ledger_blocked.csv",
        "-c",
        "tests/data/config.json",
        "-f",
        "1009",
        "-o",
        out.to_str().unwrap(),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Blocked"));
    assert!(!out.join("F1009.xml").exists());

    let forced = out_dir("forced");
    let output = exogena(&[
        "generate",
        "-l",
        "tests/data/ledger_blocked.csv",
        "-c",
        "tests/data/config.json",
        "-f",
        "1009",
        "-o",
        forced.to_str().unwrap(),
        "--force",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("NON-COMPLIANT"));
    assert!(forced.join("F1009.xml").exists());
}

/// A malformed amount stops the run
#[test]
fn generate_rejects_malformed_amount() {
    let out = out_dir("invalid");
    let output = exogena(&[
        "generate",
        "-l",
        "tests/data/ledger_invalid.csv",
        "-o",
        out.to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("line 2"));
    assert!(stderr.contains("setenta"));
}

#[test]
fn validate_clean_ledger() {
    let output = exogena(&[
        "validate",
        "-l",
        "tests/data/ledger.csv",
        "-d",
        "tests/data/directory.csv",
        "-c",
        "tests/data/config.json",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("VALIDATION RESULTS (2025)"));
    assert!(stdout.contains("F1001 Pagos"));
}

#[test]
fn validate_json_reports_errors() {
    let output = exogena(&[
        "validate",
        "-l",
        "tests/data/ledger_blocked.csv",
        "-c",
        "tests/data/config.json",
        "-f",
        "1009",
        "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let f1009 = &json[0];
    assert_eq!(f1009["format"], "1009");
    assert_eq!(f1009["error_count"], 1);
    assert_eq!(f1009["diagnostics"][0]["severity"], "Error");
}

/// The tabular document read back gives the same XML
#[test]
fn xml_from_tabular_document() {
    let out = out_dir("xml-roundtrip");
    assert!(generate(&out).status.success());

    let rebuilt = out.join("rebuilt.xml");
    let output = exogena(&[
        "xml",
        "-r",
        out.join("F1001.csv").to_str().unwrap(),
        "-f",
        "1001",
        "-c",
        "tests/data/config.json",
        "-o",
        rebuilt.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        fs::read(out.join("F1001.xml")).unwrap(),
        fs::read(&rebuilt).unwrap()
    );
}

#[test]
fn classify_shows_concepts() {
    let output = exogena(&["classify", "-l", "tests/data/ledger.csv", "-f", "1001"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("1001:5001"));
    assert!(stdout.contains("Papeleria"));
}

#[test]
fn schema_prints_ledger_header() {
    let output = exogena(&["schema", "ledger-header"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout.trim(),
        "account,label,counterparty_id,counterparty_name,debit,credit,balance"
    );
}

#[test]
fn schema_prints_config_json_schema() {
    let output = exogena(&["schema", "json-schema"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("closes_taxes"));
    assert!(stdout.contains("first_envelope"));
}
