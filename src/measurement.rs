//! # French Measurement Parsing
//!
//! This module rewrites noisy, voice-dictated French measurement text into
//! canonical compact strings, e.g. "deux grammes" → "2g" and
//! "trois tasses" → "3 tasse".
//!
//! ## Features
//!
//! - Regex-based recognition of "<number-or-word> <unit-word>" patterns
//! - French number words resolved through [`NumberWordResolver`]
//! - Decimal comma normalization ("2,5 kilogrammes" → "2.5kg")
//! - Two canonical forms: metric with no space ("250g"), cooking-tool with a
//!   single space ("2 tasse") — the space is the designed distinguishing
//!   feature between the two
//! - Graceful degradation: unrecognized text passes through unchanged
//!
//! The parser receives one candidate line at a time from the speech
//! transcription collaborator; segmentation happens upstream.

use crate::errors::AppResult;
use crate::number_words::NumberWordResolver;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Ingredient fields a transcript value can be stored under
///
/// Only `Metric` and `ToolMeasure` are measurement fields; the others get
/// either title-casing (`Name`, `Specification`) or no normalization at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientField {
    Metric,
    ToolMeasure,
    Name,
    Specification,
    Other,
}

impl IngredientField {
    /// Map the field-name strings used by persistence collaborators
    pub fn from_name(name: &str) -> Self {
        match name {
            "metric" => IngredientField::Metric,
            "toolMeasure" | "tool_measure" => IngredientField::ToolMeasure,
            "name" => IngredientField::Name,
            "specification" => IngredientField::Specification,
            _ => IngredientField::Other,
        }
    }

    fn is_measurement(self) -> bool {
        matches!(self, IngredientField::Metric | IngredientField::ToolMeasure)
    }
}

/// Outcome of a measurement parse
///
/// Distinguishes "successfully normalized" from "passed through unchanged"
/// without callers re-deriving that via string comparison. Both variants carry
/// the string the caller should store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParseOutcome {
    /// The text matched a measurement pattern and was rewritten
    Normalized(String),
    /// The text did not match; the original is returned verbatim
    Passthrough(String),
}

impl ParseOutcome {
    /// The canonical or original string, consuming the outcome
    pub fn into_inner(self) -> String {
        match self {
            ParseOutcome::Normalized(s) | ParseOutcome::Passthrough(s) => s,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParseOutcome::Normalized(s) | ParseOutcome::Passthrough(s) => s,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, ParseOutcome::Normalized(_))
    }
}

/// Metric unit spellings mapped to canonical abbreviations.
/// Plural spellings come first so table readers see the common transcript form.
const METRIC_UNIT_WORDS: &[(&str, &str)] = &[
    ("grammes", "g"),
    ("gramme", "g"),
    ("gr", "g"),
    ("g", "g"),
    ("kilogrammes", "kg"),
    ("kilogramme", "kg"),
    ("kilos", "kg"),
    ("kilo", "kg"),
    ("kg", "kg"),
    ("litres", "l"),
    ("litre", "l"),
    ("l", "l"),
    ("millilitres", "ml"),
    ("millilitre", "ml"),
    ("ml", "ml"),
    ("centilitres", "cl"),
    ("centilitre", "cl"),
    ("cl", "cl"),
];

/// Cooking-tool unit spellings (with accent and plural variants) mapped to the
/// canonical accented singular.
const TOOL_UNIT_WORDS: &[(&str, &str)] = &[
    ("tasses", "tasse"),
    ("tasse", "tasse"),
    ("cuillères", "cuillère"),
    ("cuillère", "cuillère"),
    ("cuilleres", "cuillère"),
    ("cuillere", "cuillère"),
    ("boîtes", "boîte"),
    ("boîte", "boîte"),
    ("boites", "boîte"),
    ("boite", "boîte"),
    ("cannes", "canne"),
    ("canne", "canne"),
    ("pincées", "pincée"),
    ("pincée", "pincée"),
    ("pincees", "pincée"),
    ("pincee", "pincée"),
];

/// Build an alternation fragment from unit words: deduplicate, sort longest
/// first to avoid partial matches, escape regex metacharacters, join with `|`.
fn build_alternation<'a, I: IntoIterator<Item = &'a str>>(words: I) -> String {
    let unique: std::collections::HashSet<&str> = words.into_iter().collect();
    let mut sorted: Vec<&str> = unique.into_iter().collect();
    // Longest first, then alphabetical for a stable pattern
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let escaped: Vec<String> = sorted.into_iter().map(regex::escape).collect();
    escaped.join("|")
}

/// Build the full anchored measurement pattern for a unit vocabulary
fn build_measurement_pattern(unit_words: &str, number_words: &str) -> String {
    format!(
        r"(?i)^(?P<quantity>\d+(?:[.,]\d+)?|{})\s+(?P<unit>{})(?:\s|$)",
        number_words, unit_words
    )
}

lazy_static! {
    static ref DEFAULT_RESOLVER: NumberWordResolver = NumberWordResolver::new();
    static ref DEFAULT_METRIC_REGEX: Regex = Regex::new(&build_measurement_pattern(
        &build_alternation(METRIC_UNIT_WORDS.iter().map(|(w, _)| *w)),
        &build_alternation(DEFAULT_RESOLVER.words()),
    ))
    .expect("Default metric measurement pattern should be valid");
    static ref DEFAULT_TOOL_REGEX: Regex = Regex::new(&build_measurement_pattern(
        &build_alternation(TOOL_UNIT_WORDS.iter().map(|(w, _)| *w)),
        &build_alternation(DEFAULT_RESOLVER.words()),
    ))
    .expect("Default tool measurement pattern should be valid");
    static ref METRIC_ABBREVS: HashMap<&'static str, &'static str> =
        METRIC_UNIT_WORDS.iter().copied().collect();
    static ref TOOL_CANONICAL: HashMap<&'static str, &'static str> =
        TOOL_UNIT_WORDS.iter().copied().collect();
}

/// Measurement parser for French voice transcripts
///
/// Holds the compiled metric and tool patterns plus the number-word resolver.
/// Immutable after construction; safe to share across threads.
pub struct MeasurementParser {
    metric_pattern: Regex,
    tool_pattern: Regex,
    resolver: NumberWordResolver,
}

impl Default for MeasurementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementParser {
    /// Create a parser with the built-in French vocabulary
    pub fn new() -> Self {
        Self {
            metric_pattern: DEFAULT_METRIC_REGEX.clone(),
            tool_pattern: DEFAULT_TOOL_REGEX.clone(),
            resolver: DEFAULT_RESOLVER.clone(),
        }
    }

    /// Create a parser with a custom number-word resolver
    ///
    /// The measurement patterns are rebuilt so the resolver's words appear in
    /// the quantity alternation.
    pub fn with_resolver(resolver: NumberWordResolver) -> AppResult<Self> {
        let number_words = build_alternation(resolver.words());
        let metric_pattern = Regex::new(&build_measurement_pattern(
            &build_alternation(METRIC_UNIT_WORDS.iter().map(|(w, _)| *w)),
            &number_words,
        ))?;
        let tool_pattern = Regex::new(&build_measurement_pattern(
            &build_alternation(TOOL_UNIT_WORDS.iter().map(|(w, _)| *w)),
            &number_words,
        ))?;
        Ok(Self {
            metric_pattern,
            tool_pattern,
            resolver,
        })
    }

    /// Parse a measurement field value into its canonical compact form
    ///
    /// Two patterns are tried in order, first match wins:
    /// 1. metric — "250 grammes" → `Normalized("250g")` (no space)
    /// 2. tool — "deux tasses" → `Normalized("2 tasse")` (single space)
    ///
    /// Non-measurement fields and unmatched text come back as `Passthrough`;
    /// ambiguous transcripts must never block the dictation workflow.
    pub fn parse(&self, text: &str, field: IngredientField) -> ParseOutcome {
        if !field.is_measurement() {
            return ParseOutcome::Passthrough(text.to_string());
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ParseOutcome::Passthrough(text.to_string());
        }
        let lowered = trimmed.to_lowercase();

        if let Some(caps) = self.metric_pattern.captures(&lowered) {
            let quantity = self.normalize_quantity(&caps["quantity"]);
            let unit_word = caps["unit"].to_string();
            if let Some(abbrev) = METRIC_ABBREVS.get(unit_word.as_str()) {
                let canonical = format!("{}{}", quantity, abbrev);
                debug!(input = %trimmed, output = %canonical, "Normalized metric measurement");
                return ParseOutcome::Normalized(canonical);
            }
        }

        if let Some(caps) = self.tool_pattern.captures(&lowered) {
            let quantity = self.normalize_quantity(&caps["quantity"]);
            let unit_word = caps["unit"].to_string();
            if let Some(canonical_unit) = TOOL_CANONICAL.get(unit_word.as_str()) {
                let canonical = format!("{} {}", quantity, canonical_unit);
                debug!(input = %trimmed, output = %canonical, "Normalized tool measurement");
                return ParseOutcome::Normalized(canonical);
            }
        }

        trace!(input = %trimmed, "No measurement pattern matched, passing through");
        ParseOutcome::Passthrough(text.to_string())
    }

    /// Normalize a captured quantity token: resolve number words to digits and
    /// rewrite the French decimal comma as a dot
    fn normalize_quantity(&self, token: &str) -> String {
        if token.starts_with(|c: char| c.is_ascii_digit()) {
            token.replace(',', ".")
        } else {
            self.resolver
                .resolve(token)
                .map(str::to_string)
                // Unreachable for tokens captured by the pattern, but a stray
                // word must still produce something storable
                .unwrap_or_else(|| token.to_string())
        }
    }

    /// Normalize any ingredient field value
    ///
    /// Measurement fields delegate to [`parse`](Self::parse); `name` and
    /// `specification` get their first letter upper-cased (a distinct,
    /// non-measurement normalization); unknown fields are returned unchanged.
    pub fn parse_ingredient_field(&self, text: &str, field: IngredientField) -> String {
        match field {
            IngredientField::Metric | IngredientField::ToolMeasure => {
                self.parse(text, field).into_inner()
            }
            IngredientField::Name | IngredientField::Specification => title_case_first(text),
            IngredientField::Other => text.to_string(),
        }
    }
}

/// Upper-case the first letter of the text, leaving the rest intact
fn title_case_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_first() {
        assert_eq!(title_case_first("farine tout usage"), "Farine tout usage");
        assert_eq!(title_case_first("échalote"), "Échalote");
        assert_eq!(title_case_first(""), "");
    }

    #[test]
    fn test_quantity_comma_normalization() {
        let parser = MeasurementParser::new();
        assert_eq!(parser.normalize_quantity("2,5"), "2.5");
        assert_eq!(parser.normalize_quantity("250"), "250");
        assert_eq!(parser.normalize_quantity("deux"), "2");
    }

    #[test]
    fn test_field_from_name() {
        assert_eq!(IngredientField::from_name("metric"), IngredientField::Metric);
        assert_eq!(
            IngredientField::from_name("toolMeasure"),
            IngredientField::ToolMeasure
        );
        assert_eq!(IngredientField::from_name("name"), IngredientField::Name);
        assert_eq!(IngredientField::from_name("notes"), IngredientField::Other);
    }
}
