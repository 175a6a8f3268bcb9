//! Counterparty directories (shared registry and client-supplied) read from CSV.

use exogena_derive::CsvSchema;
use std::io::Read;

use super::columns::{ColumnMap, CsvField, MissingColumns};
use super::entity::{pad_code, DirectoryEntry};

/// Columns of a directory export. Every column except the id is optional.
#[allow(dead_code)]
#[derive(CsvSchema)]
pub struct DirectoryColumns {
    /// Counterparty id; dots and dashes are ignored
    #[csv(aliases("nit", "identificacion", "documento", "numero documento"))]
    id: String,
    /// Legal name, or full name of a person as "surname surname given given"
    #[csv(aliases("razon social", "nombre", "nombre completo", "tercero"))]
    name: Option<String>,
    /// Street address
    #[csv(aliases("direccion"))]
    street: Option<String>,
    /// Department code (2 digits)
    #[csv(aliases("departamento", "cod depto", "dpto", "depto"))]
    region: Option<String>,
    /// Municipality code (3 digits)
    #[csv(aliases("municipio", "cod mpio", "mpio", "ciudad"))]
    locality: Option<String>,
    /// Country code (3 digits, 169 for Colombia)
    #[csv(aliases("pais", "cod pais"))]
    country: Option<String>,
    /// Document type code (13, 31, 42...)
    #[csv(aliases("tipo documento", "tipo doc", "tdoc"))]
    id_type: Option<String>,
    /// Check digit of a NIT
    #[csv(aliases("dv", "digito verificacion"))]
    check_digit: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Columns(#[from] MissingColumns),
}

fn cell(columns: &ColumnMap, record: &csv::StringRecord, name: &str) -> Option<String> {
    let value = columns.get(record, name);
    (!value.is_empty()).then(|| value.to_string())
}

/// Split "900.123.456-8" into the bare id and its trailing check digit.
fn split_id(raw: &str) -> (String, Option<String>) {
    let clean = |s: &str| -> String { s.chars().filter(|c| !matches!(c, '.' | '-' | ' ')).collect() };
    if let Some((id, digit)) = raw.trim().rsplit_once('-') {
        let id = clean(id);
        let digit = digit.trim();
        if digit.len() == 1
            && digit.chars().all(|c| c.is_ascii_digit())
            && !id.is_empty()
            && id.chars().all(|c| c.is_ascii_digit())
        {
            return (id, Some(digit.to_string()));
        }
    }
    (clean(raw), None)
}

pub fn read_directory<R: Read>(reader: R) -> Result<Vec<DirectoryEntry>, DirectoryError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::detect(DirectoryColumns::csv_schema(), headers.iter())?;

    let mut entries = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let (id, suffix_digit) = split_id(columns.get(&record, "id"));
        if id.is_empty() {
            continue;
        }
        entries.push(DirectoryEntry {
            id,
            name: cell(&columns, &record, "name"),
            street: cell(&columns, &record, "street"),
            region: cell(&columns, &record, "region").map(|r| pad_code(&r, 2)),
            locality: cell(&columns, &record, "locality").map(|l| pad_code(&l, 3)),
            country: cell(&columns, &record, "country"),
            id_type: cell(&columns, &record, "id_type"),
            check_digit: cell(&columns, &record, "check_digit").or(suffix_digit),
        });
    }
    log::info!("read {} directory entries", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_directory_entries() {
        let data = "\
NIT,Razon Social,Direccion,Departamento,Municipio,Pais,DV
900.123.456-8,ACME SAS,CL 10 # 1-1,5,1,169,
13551234,,,,,,
,SIN ID,,,,,
";
        let entries = read_directory(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "900123456");
        assert_eq!(entries[0].region.as_deref(), Some("05"));
        assert_eq!(entries[0].locality.as_deref(), Some("001"));
        assert_eq!(entries[0].check_digit.as_deref(), Some("8"));
        assert_eq!(entries[1].name, None);
    }

    #[test]
    fn id_column_required() {
        assert!(matches!(
            read_directory("Razon Social\nACME\n".as_bytes()),
            Err(DirectoryError::Columns(_))
        ));
    }
}
