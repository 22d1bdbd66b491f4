//! # French Number Word Resolution
//!
//! Maps spoken French number words to digit strings. This is the leaf
//! dependency of the measurement parser: voice-dictated quantities arrive as
//! words ("deux grammes") and must be rewritten as digits before a canonical
//! measurement string can be emitted.
//!
//! The table covers 0–16, the round tens (20–60), and the two magnitude words
//! (100, 1000). Multi-word composites ("vingt-deux") are deliberately not
//! reduced — spoken recipe quantities rarely exceed simple numerals, and the
//! parser passes unrecognized words through unchanged.

use crate::errors::{AppError, AppResult};
use std::collections::HashMap;
use tracing::trace;

/// Built-in French number-word table: (word, digit string).
const FRENCH_NUMBER_WORDS: &[(&str, &str)] = &[
    ("zéro", "0"),
    ("zero", "0"),
    ("un", "1"),
    ("une", "1"),
    ("deux", "2"),
    ("trois", "3"),
    ("quatre", "4"),
    ("cinq", "5"),
    ("six", "6"),
    ("sept", "7"),
    ("huit", "8"),
    ("neuf", "9"),
    ("dix", "10"),
    ("onze", "11"),
    ("douze", "12"),
    ("treize", "13"),
    ("quatorze", "14"),
    ("quinze", "15"),
    ("seize", "16"),
    ("vingt", "20"),
    ("trente", "30"),
    ("quarante", "40"),
    ("cinquante", "50"),
    ("soixante", "60"),
    ("cent", "100"),
    ("mille", "1000"),
];

/// Resolves spoken number words to digit strings via an immutable lookup table
///
/// The default resolver uses the built-in French table. A resolver can also be
/// constructed from a caller-supplied table (e.g. for another language) rather
/// than mutating shared state.
#[derive(Debug, Clone)]
pub struct NumberWordResolver {
    table: HashMap<String, String>,
}

impl Default for NumberWordResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberWordResolver {
    /// Create a resolver backed by the built-in French number-word table
    pub fn new() -> Self {
        let table = FRENCH_NUMBER_WORDS
            .iter()
            .map(|(word, digits)| (word.to_string(), digits.to_string()))
            .collect();
        Self { table }
    }

    /// Create a resolver from a custom word → digit-string table
    ///
    /// # Arguments
    /// * `table` - Entries of (spoken word, digit string)
    ///
    /// # Returns
    /// * `Ok(NumberWordResolver)` - All entries are valid
    /// * `Err(AppError::Config)` - An entry has an empty word, control
    ///   characters, or a non-numeric value
    pub fn with_table<I, S, V>(table: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (word, digits) in table {
            let word = word.into();
            let digits = digits.into();
            if word.trim().is_empty() {
                return Err(AppError::Config(
                    "number word cannot be empty".to_string(),
                ));
            }
            if word.chars().any(|c| c.is_control()) {
                return Err(AppError::Config(format!(
                    "number word '{}' contains control characters",
                    word.escape_debug()
                )));
            }
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::Config(format!(
                    "number word '{}' maps to non-numeric value '{}'",
                    word, digits
                )));
            }
            map.insert(word.to_lowercase(), digits);
        }
        if map.is_empty() {
            return Err(AppError::Config(
                "number word table cannot be empty".to_string(),
            ));
        }
        Ok(Self { table: map })
    }

    /// Resolve a lowercase word token to its digit-string equivalent
    ///
    /// Returns `None` for unknown words; there are no other failure modes.
    pub fn resolve(&self, word: &str) -> Option<&str> {
        let resolved = self.table.get(&word.to_lowercase()).map(String::as_str);
        trace!(word = %word, resolved = ?resolved, "Number word lookup");
        resolved
    }

    /// All words known to this resolver, for embedding in regex alternations
    pub fn words(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_french_words() {
        let resolver = NumberWordResolver::new();
        assert_eq!(resolver.resolve("deux"), Some("2"));
        assert_eq!(resolver.resolve("seize"), Some("16"));
        assert_eq!(resolver.resolve("soixante"), Some("60"));
        assert_eq!(resolver.resolve("cent"), Some("100"));
        assert_eq!(resolver.resolve("mille"), Some("1000"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let resolver = NumberWordResolver::new();
        assert_eq!(resolver.resolve("Deux"), Some("2"));
        assert_eq!(resolver.resolve("TROIS"), Some("3"));
    }

    #[test]
    fn test_unknown_word_returns_none() {
        let resolver = NumberWordResolver::new();
        assert_eq!(resolver.resolve("vingt-deux"), None);
        assert_eq!(resolver.resolve("farine"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_custom_table() {
        let resolver =
            NumberWordResolver::with_table(vec![("two", "2"), ("three", "3")]).unwrap();
        assert_eq!(resolver.resolve("two"), Some("2"));
        assert_eq!(resolver.resolve("deux"), None);
    }

    #[test]
    fn test_custom_table_rejects_invalid_entries() {
        assert!(NumberWordResolver::with_table(vec![("", "2")]).is_err());
        assert!(NumberWordResolver::with_table(vec![("two", "abc")]).is_err());
        assert!(NumberWordResolver::with_table(Vec::<(&str, &str)>::new()).is_err());
    }
}
