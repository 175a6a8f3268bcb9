//! Label normalisation and a light Spanish plural stemmer used by keyword rules.

use std::collections::BTreeSet;

const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '-', '_', '/', '\\', '(', ')', '[', ']', '{', '}', '#', '"', '\'', '&',
    '$', '%', '@', '!', '¡', '¿', '?',
];

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Case-fold, strip diacritics and punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(fold_char)
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip Spanish plural endings: `-es` on words longer than five letters,
/// otherwise a single trailing `s` (but not `ss`). Words under four letters
/// are left alone.
pub fn stem(word: &str) -> String {
    let len = word.chars().count();
    if len < 4 {
        return word.to_string();
    }
    if len > 5 {
        if let Some(stripped) = word.strip_suffix("es") {
            return stripped.to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// A normalised label prepared once for repeated keyword tests.
#[derive(Debug, Clone)]
pub struct PreparedLabel {
    pub normalized: String,
    pub stemmed: String,
    pub words: BTreeSet<String>,
    pub stems: BTreeSet<String>,
}

impl PreparedLabel {
    pub fn new(label: &str) -> Self {
        let normalized = normalize(label);
        let words: BTreeSet<String> = normalized.split(' ').map(str::to_string).collect();
        let stemmed = normalized
            .split(' ')
            .map(stem)
            .collect::<Vec<_>>()
            .join(" ");
        let stems = stemmed.split(' ').map(str::to_string).collect();
        PreparedLabel {
            normalized,
            stemmed,
            words,
            stems,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// A multi-word phrase matches verbatim or after stemming each of its words.
    pub fn matches_phrase(&self, phrase: &str) -> bool {
        let stemmed_phrase = phrase.split(' ').map(stem).collect::<Vec<_>>().join(" ");
        self.stemmed.contains(&stemmed_phrase) || self.normalized.contains(phrase)
    }

    /// A single word matches as a whole token or by its stem.
    pub fn matches_word(&self, word: &str) -> bool {
        self.words.contains(word) || self.stems.contains(&stem(word))
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.normalized.contains(fragment)
    }
}
