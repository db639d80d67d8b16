use std::collections::HashMap;

use super::Tool;

const TRIGGER: &str = "define";
const NOT_FOUND: &str = "Definition not found.";

const BUILTIN: &[(&str, &str)] = &[
    ("python", "A high-level programming language."),
    (
        "ai",
        "Artificial Intelligence is the simulation of human intelligence in machines.",
    ),
];

/// Fixed word → definition table. Keys are lower-case and unique.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    /// The table shipped with the server.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().copied())
    }

    /// Build a table from arbitrary pairs. Later duplicates win.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answer a "define <word>" query. A missing word is a normal answer.
    pub fn define(&self, query: &str) -> String {
        let word = extract_word(query);
        let meaning = self.lookup(&word).unwrap_or(NOT_FOUND);
        format!("Definition of {}:\n{}", word, meaning)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Everything after the last "define", lower-cased and trimmed.
pub fn extract_word(query: &str) -> String {
    let lowered = query.to_lowercase();
    lowered
        .rsplit(TRIGGER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

impl Tool for Dictionary {
    fn name(&self) -> &str {
        "dictionary"
    }

    fn trigger(&self) -> &str {
        TRIGGER
    }

    fn execute(&self, query: &str) -> String {
        self.define(query)
    }
}
