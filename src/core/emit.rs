//! Tabular (CSV) and XML renditions of a format's records.

use chrono::NaiveDate;
use std::fmt::Write as _;
use std::io::{Read, Write};

use super::config::Filer;
use super::format::FormatDef;
use super::record::OutputRecord;

const XML_NAMESPACE: &str = "http://www.dian.gov.co/muisca/mas";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#;
/// Concept code of an original (not corrective) submission.
const ORIGINAL_SUBMISSION: &str = "1";

#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("header does not match format {format}: expected '{expected}', found '{found}'")]
    Header {
        format: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// Write the fixed header row and one row per record.
pub fn write_tabular<W: Write>(
    writer: W,
    def: &FormatDef,
    records: &[OutputRecord],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(def.headers())?;
    for record in records {
        wtr.write_record(record.to_row(def))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a tabular document written by [`write_tabular`], possibly edited by
/// hand. Headers are compared leniently (case and surrounding spaces).
pub fn read_tabular<R: Read>(reader: R, def: &FormatDef) -> Result<Vec<OutputRecord>, TabularError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let expected_headers = def.headers();
    if let Some(missing) = expected_headers.get(headers.len()) {
        return Err(TabularError::Header {
            format: def.code,
            expected: *missing,
            found: "end of header row".to_string(),
        });
    }
    for (expected, found) in expected_headers.into_iter().zip(headers.iter()) {
        if !expected.eq_ignore_ascii_case(found.trim()) {
            return Err(TabularError::Header {
                format: def.code,
                expected,
                found: found.to_string(),
            });
        }
    }
    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = result?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(OutputRecord::from_row(def, i + 2, row.iter()));
    }
    Ok(records)
}

/// Header block values of one XML envelope.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    pub year: i32,
    pub number: u32,
    pub submission_date: NaiveDate,
    pub filer: &'a Filer,
}

/// Render the XML envelope of a format. Records must already be sanitized.
pub fn render_xml(def: &FormatDef, records: &[OutputRecord], envelope: &Envelope) -> String {
    let filer = envelope.filer;
    let year = envelope.year.to_string();
    let header = [
        ("CodCpt", ORIGINAL_SUBMISSION.to_string()),
        ("Formato", def.code.to_string()),
        ("Version", def.version.to_string()),
        ("AnoGrav", year.clone()),
        ("NumEnvio", format!("{:05}", envelope.number)),
        ("FecEnvio", envelope.submission_date.format("%Y-%m-%d").to_string()),
        ("FecIni", format!("{}-01-01", year)),
        ("FecFin", format!("{}-12-31", year)),
        ("NumReg", records.len().to_string()),
        ("TipoDoc", filer.id_type().to_string()),
        ("NumNit", filer.id.clone()),
        ("DV", filer.check_digit()),
        ("Ape1", filer.first_surname.clone()),
        ("Ape2", filer.second_surname.clone()),
        ("Nom1", filer.first_name.clone()),
        ("Nom2", filer.second_name.clone()),
        ("RazonSocial", filer.legal_name.clone()),
        ("Direccion", filer.street.clone()),
        ("CodDpto", filer.region.clone()),
        ("CodMpio", filer.locality.clone()),
    ];

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    let _ = writeln!(xml, "<mas xmlns=\"{}\">", XML_NAMESPACE);
    xml.push_str("  <Cab>\n");
    for (tag, value) in &header {
        element(&mut xml, 4, tag, value);
    }
    xml.push_str("  </Cab>\n");
    let _ = writeln!(xml, "  <{}>", def.body_tag);
    let fields = def.identity_fields();
    for record in records {
        let _ = writeln!(xml, "    <{}>", def.row_tag);
        for field in &fields {
            element(&mut xml, 6, field.xml_tag(), record.field(*field));
        }
        for (i, column) in def.values.iter().enumerate() {
            let value = record.values.get(i).map(String::as_str).unwrap_or("");
            let value = if value.is_empty() { "0" } else { value };
            element(&mut xml, 6, column.key, value);
        }
        let _ = writeln!(xml, "    </{}>", def.row_tag);
    }
    let _ = writeln!(xml, "  </{}>", def.body_tag);
    xml.push_str("</mas>\n");
    xml
}

fn element(xml: &mut String, indent: usize, tag: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        let _ = writeln!(xml, "{:indent$}<{}/>", "", tag, indent = indent);
    } else {
        let _ = writeln!(xml, "{:indent$}<{}>{}</{}>", "", tag, escape(value), tag, indent = indent);
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// ISO-8859-1 bytes of `text`; characters outside Latin-1 become `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::{F1001, F1009};

    fn record() -> OutputRecord {
        OutputRecord {
            row: 2,
            concept: "2205".into(),
            id_type: "31".into(),
            id: "900123456".into(),
            check_digit: "8".into(),
            legal_name: "ACME & HIJOS S.A.S.".into(),
            street: "CL 10 # 5-20".into(),
            region: "11".into(),
            locality: "001".into(),
            values: vec!["2500000".into()],
            ..Default::default()
        }
    }

    fn filer() -> Filer {
        Filer {
            id: "900999999".into(),
            legal_name: "DECLARANTE SAS".into(),
            street: "CR 7 # 1-1".into(),
            region: "11".into(),
            locality: "001".into(),
            ..Default::default()
        }
    }

    #[test]
    fn tabular_round_trip() {
        let mut buf = Vec::new();
        write_tabular(&mut buf, &F1009, &[record()]).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Concepto,Tipo Doc,No ID,DV,"));
        let records = read_tabular(buf.as_slice(), &F1009).unwrap();
        assert_eq!(records, vec![record()]);
    }

    #[test]
    fn tabular_rejects_foreign_header() {
        let doc = "Cuenta,Nit\n1,2\n";
        assert!(matches!(
            read_tabular(doc.as_bytes(), &F1009),
            Err(TabularError::Header { .. })
        ));
    }

    #[test]
    fn tabular_rejects_missing_columns() {
        let mut doc = Vec::new();
        write_tabular(&mut doc, &F1009, &[record()]).unwrap();
        let text = String::from_utf8(doc).unwrap();
        let truncated: String = text
            .lines()
            .map(|line| line.rsplit_once(',').map_or(line, |(head, _)| head))
            .collect::<Vec<_>>()
            .join("\n");
        match read_tabular(truncated.as_bytes(), &F1009) {
            Err(TabularError::Header { expected, .. }) => assert_eq!(expected, *F1009.headers().last().unwrap()),
            other => panic!("expected a header error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn xml_envelope() {
        let filer = filer();
        let envelope = Envelope {
            year: 2025,
            number: 3,
            submission_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            filer: &filer,
        };
        let xml = render_xml(&F1009, &[record()], &envelope);
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<mas xmlns=\"http://www.dian.gov.co/muisca/mas\">"));
        assert!(xml.contains("    <NumEnvio>00003</NumEnvio>\n"));
        assert!(xml.contains("    <FecIni>2025-01-01</FecIni>\n"));
        assert!(xml.contains("    <NumReg>1</NumReg>\n"));
        assert!(xml.contains("      <raz>ACME &amp; HIJOS S.A.S.</raz>\n"));
        assert!(xml.contains("      <ape1/>\n"));
        assert!(xml.contains("      <saldo_cxp>2500000</saldo_cxp>\n"));
        assert!(xml.contains("  <cxpagar>\n    <cxp>\n"));
        assert!(!xml.contains("<pais"));
    }

    #[test]
    fn empty_values_render_as_zero() {
        let filer = filer();
        let envelope = Envelope {
            year: 2025,
            number: 1,
            submission_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            filer: &filer,
        };
        let mut r = record();
        r.concept = "5016".into();
        r.values = vec![String::new(); 8];
        let xml = render_xml(&F1001, &[r], &envelope);
        assert!(xml.contains("<retfte_practicada>0</retfte_practicada>"));
    }

    #[test]
    fn latin1_encoding() {
        assert_eq!(to_latin1("Bogotá"), b"Bogot\xe1".to_vec());
        assert_eq!(to_latin1("€"), b"?".to_vec());
    }
}
