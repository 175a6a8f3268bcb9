//! Ordered classification rules and the single dispatcher that evaluates them.
//!
//! A [`RuleTable`] is an ordered list of tagged rules. Evaluation walks the
//! list in declaration order and the first rule that matches decides the
//! outcome, so reordering a table changes results.

use super::text::PreparedLabel;

/// Outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub concept: &'static str,
    pub deductible: bool,
}

/// Inclusive account-code prefix range. Both bounds have the same digit
/// length; an account matches when its leading digits at that length fall
/// within the bounds lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRange {
    pub start: &'static str,
    pub end: &'static str,
}

impl AccountRange {
    pub const fn new(start: &'static str, end: &'static str) -> Self {
        AccountRange { start, end }
    }

    pub const fn single(code: &'static str) -> Self {
        AccountRange {
            start: code,
            end: code,
        }
    }

    pub fn contains(&self, account: &str) -> bool {
        in_range(account, self.start, self.end)
    }
}

/// Prefix containment test shared by every range-based rule.
pub fn in_range(account: &str, start: &str, end: &str) -> bool {
    let prefix = account.get(..start.len()).unwrap_or(account);
    prefix >= start && prefix <= end
}

/// Concept assigned when any phrase of the rule matches a label.
/// Phrases containing a space are multi-word phrases; the rest are single words.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub concept: &'static str,
    pub deductible: bool,
    pub phrases: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Account range mapped to a concept.
    Range {
        concept: &'static str,
        range: AccountRange,
        deductible: bool,
    },
    /// Keyword group: multi-word phrases of every rule are tried before any
    /// single-word stem, then the first rule in group order wins.
    Keywords(&'static [KeywordRule]),
    /// The two digits following `prefix` select the concept.
    SubAccount {
        prefix: &'static str,
        map: &'static [(&'static str, &'static str)],
        deductible: bool,
    },
    /// Accounts in range are out of scope; evaluation stops with no concept.
    Exclude(AccountRange),
}

/// A rule, optionally restricted to accounts within `scope`.
#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
    pub scope: Option<AccountRange>,
    pub rule: Rule,
}

impl RuleEntry {
    pub const fn any(rule: Rule) -> Self {
        RuleEntry { scope: None, rule }
    }

    pub const fn scoped(scope: AccountRange, rule: Rule) -> Self {
        RuleEntry {
            scope: Some(scope),
            rule,
        }
    }
}

enum Evaluation {
    Matched(Classification),
    Excluded,
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    pub name: &'static str,
    pub rules: Vec<RuleEntry>,
}

impl RuleTable {
    pub fn new(name: &'static str, rules: Vec<RuleEntry>) -> Self {
        RuleTable { name, rules }
    }

    /// Classify an account code with its optional free-text label.
    /// Returns `None` when the row is out of scope for this table.
    pub fn classify(&self, account: &str, label: &str) -> Option<Classification> {
        let label = PreparedLabel::new(label);
        for entry in &self.rules {
            if let Some(scope) = entry.scope {
                if !scope.contains(account) {
                    continue;
                }
            }
            match evaluate(&entry.rule, account, &label) {
                Evaluation::Matched(classification) => return Some(classification),
                Evaluation::Excluded => return None,
                Evaluation::NoMatch => continue,
            }
        }
        None
    }

    /// Reject empty tables and malformed rules before a format uses them.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        if self.rules.is_empty() {
            return Err(ConfigurationError::EmptyRuleTable(self.name.to_string()));
        }
        for entry in &self.rules {
            if let Some(scope) = entry.scope {
                check_range(self.name, scope)?;
            }
            match entry.rule {
                Rule::Range { range, .. } | Rule::Exclude(range) => check_range(self.name, range)?,
                Rule::Keywords(group) => {
                    if group.is_empty() {
                        return Err(ConfigurationError::EmptyKeywords {
                            table: self.name.to_string(),
                            concept: String::new(),
                        });
                    }
                    for keyword in group {
                        if keyword.phrases.is_empty() || keyword.phrases.iter().any(|p| p.trim().is_empty()) {
                            return Err(ConfigurationError::EmptyKeywords {
                                table: self.name.to_string(),
                                concept: keyword.concept.to_string(),
                            });
                        }
                    }
                }
                Rule::SubAccount { prefix, map, .. } => {
                    if prefix.is_empty() || map.is_empty() {
                        return Err(ConfigurationError::MalformedSubAccount {
                            table: self.name.to_string(),
                            prefix: prefix.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_range(table: &str, range: AccountRange) -> Result<(), ConfigurationError> {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(range.start)
        || !digits(range.end)
        || range.start.len() != range.end.len()
        || range.start > range.end
    {
        return Err(ConfigurationError::MalformedRange {
            table: table.to_string(),
            start: range.start.to_string(),
            end: range.end.to_string(),
        });
    }
    Ok(())
}

fn evaluate(rule: &Rule, account: &str, label: &PreparedLabel) -> Evaluation {
    match *rule {
        Rule::Range {
            concept,
            range,
            deductible,
        } => {
            if range.contains(account) {
                Evaluation::Matched(Classification {
                    concept,
                    deductible,
                })
            } else {
                Evaluation::NoMatch
            }
        }
        Rule::Keywords(group) => match match_keywords(group, label) {
            Some(classification) => Evaluation::Matched(classification),
            None => Evaluation::NoMatch,
        },
        Rule::SubAccount {
            prefix,
            map,
            deductible,
        } => {
            let Some(rest) = account.strip_prefix(prefix) else {
                return Evaluation::NoMatch;
            };
            let digits = rest.get(..2).unwrap_or(rest);
            map.iter()
                .find(|(sub, _)| *sub == digits)
                .map(|(_, concept)| {
                    Evaluation::Matched(Classification {
                        concept,
                        deductible,
                    })
                })
                .unwrap_or(Evaluation::NoMatch)
        }
        Rule::Exclude(range) => {
            if range.contains(account) {
                Evaluation::Excluded
            } else {
                Evaluation::NoMatch
            }
        }
    }
}

/// Phrase pass over the whole group, then the single-word pass.
pub fn match_keywords(group: &[KeywordRule], label: &PreparedLabel) -> Option<Classification> {
    if label.is_empty() {
        return None;
    }
    let hit = |keyword: &KeywordRule| Classification {
        concept: keyword.concept,
        deductible: keyword.deductible,
    };
    for keyword in group {
        if keyword
            .phrases
            .iter()
            .filter(|p| p.contains(' '))
            .any(|p| label.matches_phrase(p))
        {
            return Some(hit(keyword));
        }
    }
    for keyword in group {
        if keyword
            .phrases
            .iter()
            .filter(|p| !p.contains(' '))
            .any(|p| label.matches_word(p))
        {
            return Some(hit(keyword));
        }
    }
    None
}

/// A rule table could not be used for a requested format.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("rule table {0} is empty")]
    EmptyRuleTable(String),
    #[error("rule table {table}: malformed account range {start}..{end}")]
    MalformedRange {
        table: String,
        start: String,
        end: String,
    },
    #[error("rule table {table}: keyword rule for concept '{concept}' has no phrases")]
    EmptyKeywords { table: String, concept: String },
    #[error("rule table {table}: sub-account rule under '{prefix}' is empty")]
    MalformedSubAccount { table: String, prefix: String },
    #[error("unknown format code: {0}")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    static TRAVEL: &[KeywordRule] = &[
        KeywordRule {
            concept: "A",
            deductible: true,
            phrases: &["viaje"],
        },
        KeywordRule {
            concept: "B",
            deductible: false,
            phrases: &["gastos de viaje", "hotel"],
        },
    ];

    #[test]
    fn in_range_uses_start_length() {
        assert!(in_range("513505", "5135", "5139"));
        assert!(in_range("5139", "5135", "5139"));
        assert!(!in_range("514005", "5135", "5139"));
        assert!(!in_range("51", "5105", "5105"));
    }

    #[test]
    fn phrases_checked_before_single_words() {
        let label = PreparedLabel::new("Gastos de viaje");
        let hit = match_keywords(TRAVEL, &label).unwrap();
        assert_eq!(hit.concept, "B");
        assert!(!hit.deductible);
    }

    #[test]
    fn first_match_wins_in_declaration_order() {
        let range = Rule::Range {
            concept: "R",
            range: AccountRange::new("5135", "5139"),
            deductible: true,
        };
        let keywords = Rule::Keywords(TRAVEL);
        let range_first = RuleTable::new("t", vec![RuleEntry::any(range), RuleEntry::any(keywords)]);
        let keywords_first = RuleTable::new("t", vec![RuleEntry::any(keywords), RuleEntry::any(range)]);
        assert_eq!(range_first.classify("513505", "Hotel").unwrap().concept, "R");
        assert_eq!(keywords_first.classify("513505", "Hotel").unwrap().concept, "B");
        assert_eq!(keywords_first.classify("513505", "").unwrap().concept, "R");
    }

    #[test]
    fn exclude_stops_evaluation() {
        let table = RuleTable::new(
            "t",
            vec![
                RuleEntry::any(Rule::Exclude(AccountRange::single("135518"))),
                RuleEntry::any(Rule::Range {
                    concept: "X",
                    range: AccountRange::single("1355"),
                    deductible: true,
                }),
            ],
        );
        assert_eq!(table.classify("13551801", ""), None);
        assert_eq!(table.classify("13551505", "").unwrap().concept, "X");
    }

    #[test]
    fn sub_account_uses_next_two_digits() {
        static MAP: &[(&str, &str)] = &[("06", "5001"), ("02", "5024")];
        let table = RuleTable::new(
            "t",
            vec![RuleEntry::any(Rule::SubAccount {
                prefix: "5105",
                map: MAP,
                deductible: true,
            })],
        );
        assert_eq!(table.classify("510506", "").unwrap().concept, "5001");
        assert_eq!(table.classify("51050201", "").unwrap().concept, "5024");
        assert_eq!(table.classify("510599", ""), None);
        assert_eq!(table.classify("520506", ""), None);
    }

    #[test]
    fn scope_restricts_rules() {
        let table = RuleTable::new(
            "t",
            vec![RuleEntry::scoped(
                AccountRange::new("51", "53"),
                Rule::Keywords(TRAVEL),
            )],
        );
        assert!(table.classify("513505", "viaje").is_some());
        assert!(table.classify("613505", "viaje").is_none());
    }

    #[test]
    fn check_rejects_empty_and_malformed_tables() {
        assert_eq!(
            RuleTable::new("empty", vec![]).check(),
            Err(ConfigurationError::EmptyRuleTable("empty".into()))
        );
        let reversed = RuleTable::new(
            "bad",
            vec![RuleEntry::any(Rule::Range {
                concept: "X",
                range: AccountRange::new("5199", "5100"),
                deductible: true,
            })],
        );
        assert!(matches!(
            reversed.check(),
            Err(ConfigurationError::MalformedRange { .. })
        ));
        static EMPTY: &[KeywordRule] = &[KeywordRule {
            concept: "Z",
            deductible: true,
            phrases: &[],
        }];
        let no_phrases = RuleTable::new("kw", vec![RuleEntry::any(Rule::Keywords(EMPTY))]);
        assert!(matches!(
            no_phrases.check(),
            Err(ConfigurationError::EmptyKeywords { .. })
        ));
    }
}
