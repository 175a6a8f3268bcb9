//! Header detection for spreadsheet exports whose column names vary.

use super::text::normalize;

/// Column description generated by `#[derive(CsvSchema)]`.
#[derive(Debug, Clone, Copy)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("missing required column(s): {}", .0.join(", "))]
pub struct MissingColumns(pub Vec<&'static str>);

/// Position of each schema field in a header row, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: Vec<(&'static str, Option<usize>)>,
}

impl ColumnMap {
    /// Match headers against each field's name and aliases. An exact match
    /// wins over a containing match; each header is used at most once.
    pub fn detect<'a>(
        schema: &'static [CsvField],
        headers: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, MissingColumns> {
        let headers: Vec<String> = headers.into_iter().map(normalize).collect();
        let mut taken = vec![false; headers.len()];
        let mut positions = Vec::with_capacity(schema.len());

        for field in schema {
            let candidates: Vec<String> = std::iter::once(field.name.replace('_', " "))
                .chain(field.aliases.iter().map(|a| normalize(a)))
                .collect();
            let exact = headers
                .iter()
                .enumerate()
                .find(|(i, h)| !taken[*i] && candidates.iter().any(|c| *h == c));
            let found = exact
                .or_else(|| {
                    headers.iter().enumerate().find(|(i, h)| {
                        !taken[*i] && !h.is_empty() && candidates.iter().any(|c| h.contains(c.as_str()))
                    })
                })
                .map(|(i, _)| i);
            if let Some(i) = found {
                taken[i] = true;
            }
            positions.push((field.name, found));
        }

        let missing: Vec<&'static str> = schema
            .iter()
            .zip(&positions)
            .filter(|(field, (_, pos))| field.required && pos.is_none())
            .map(|(field, _)| field.name)
            .collect();
        if !missing.is_empty() {
            return Err(MissingColumns(missing));
        }
        Ok(ColumnMap { positions })
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, pos)| *pos)
    }

    /// Trimmed cell for a field, empty when the column is absent.
    pub fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.position(name)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SCHEMA: &[CsvField] = &[
        CsvField {
            name: "account",
            required: true,
            description: "",
            aliases: &["cuenta", "codigo"],
        },
        CsvField {
            name: "label",
            required: false,
            description: "",
            aliases: &["nombre cuenta", "descripcion"],
        },
        CsvField {
            name: "balance",
            required: false,
            description: "",
            aliases: &["saldo final", "saldo"],
        },
    ];

    #[test]
    fn detects_aliases_with_accents_and_case() {
        let map = ColumnMap::detect(SCHEMA, ["Código Cuenta", "Nombre Cuenta", "Saldo Final"]).unwrap();
        assert_eq!(map.position("account"), Some(0));
        assert_eq!(map.position("label"), Some(1));
        assert_eq!(map.position("balance"), Some(2));
    }

    #[test]
    fn exact_match_preferred_and_headers_used_once() {
        let map = ColumnMap::detect(SCHEMA, ["Nombre Cuenta", "Cuenta", "Saldo"]).unwrap();
        assert_eq!(map.position("account"), Some(1));
        assert_eq!(map.position("label"), Some(0));
    }

    #[test]
    fn missing_required_column() {
        let err = ColumnMap::detect(SCHEMA, ["Saldo"]).unwrap_err();
        assert_eq!(err, MissingColumns(vec!["account"]));
        assert_eq!(err.to_string(), "missing required column(s): account");
    }
}
