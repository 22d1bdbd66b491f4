//! # Unit Classification and Conversion
//!
//! Classifies raw unit strings into tool/weight/volume/count domains, converts
//! quantities between compatible units, and normalizes prices to a per-gram or
//! per-milliliter figure for ingredient costing.
//!
//! The load-bearing invariant here is the *sticky tool* rule: a container unit
//! with an embedded weight ("caisse 5lb") stays a tool unit. The embedded
//! weight rides along for price math only — a case of produce priced by the
//! case must remain comparable to other cases, never silently become a weight
//! unit.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Domain a unit string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Tool,
    Weight,
    Volume,
    Count,
    Unknown,
}

/// Result of classifying a raw unit string
///
/// Derived, never persisted; recomputed from the stored unit on every call.
/// For weight/volume units `weight_g`/`volume_ml` hold grams or milliliters
/// per one unit. For tool units they hold the embedded per-container amount,
/// when the string carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitClassification {
    pub unit_type: UnitType,
    pub tool_unit: Option<String>,
    pub tool_abbrev: Option<String>,
    pub base_unit: Option<String>,
    pub weight_g: Option<f64>,
    pub volume_ml: Option<f64>,
    pub enforce_metric: bool,
}

impl UnitClassification {
    fn unknown() -> Self {
        Self {
            unit_type: UnitType::Unknown,
            tool_unit: None,
            tool_abbrev: None,
            base_unit: None,
            weight_g: None,
            volume_ml: None,
            enforce_metric: false,
        }
    }
}

/// Normalized price per base unit, 6-decimal precision
///
/// A unit is either weight-flavored or volume-flavored, never both; at most
/// one field is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePerUnit {
    pub price_per_g: Option<f64>,
    pub price_per_ml: Option<f64>,
}

/// Which measurement field a linked recipe ingredient must fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementDiscipline {
    Tool,
    Metric,
}

/// The measurement discipline and unit enforced by an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcedMeasurement {
    pub discipline: MeasurementDiscipline,
    pub unit: String,
}

/// Inventory item fields this module cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

/// Tool/container nouns with display abbreviations. Matched as a prefix or
/// whole token; plural 's' tolerated.
const TOOL_NOUNS: &[(&str, &str)] = &[
    ("canne", "cn"),
    ("boîte", "bte"),
    ("boite", "bte"),
    ("botte", "bot"),
    ("sac", "sac"),
    ("caisse", "cs"),
    ("douzaine", "dz"),
    ("pot", "pot"),
    ("bouteille", "btl"),
    ("paquet", "pqt"),
    ("barquette", "brq"),
];

/// Weight unit synonyms: (spelling, canonical key, grams per unit)
const WEIGHT_UNITS: &[(&str, &str, f64)] = &[
    ("g", "g", 1.0),
    ("gr", "g", 1.0),
    ("gramme", "g", 1.0),
    ("grammes", "g", 1.0),
    ("gram", "g", 1.0),
    ("grams", "g", 1.0),
    ("kg", "kg", 1000.0),
    ("kilo", "kg", 1000.0),
    ("kilos", "kg", 1000.0),
    ("kilogramme", "kg", 1000.0),
    ("kilogrammes", "kg", 1000.0),
    ("kilogram", "kg", 1000.0),
    ("kilograms", "kg", 1000.0),
    ("lb", "lb", 453.592),
    ("lbs", "lb", 453.592),
    ("livre", "lb", 453.592),
    ("livres", "lb", 453.592),
    ("pound", "lb", 453.592),
    ("pounds", "lb", 453.592),
    ("oz", "oz", 28.3495),
    ("once", "oz", 28.3495),
    ("onces", "oz", 28.3495),
    ("ounce", "oz", 28.3495),
    ("ounces", "oz", 28.3495),
];

/// Volume unit synonyms: (spelling, canonical key, milliliters per unit)
const VOLUME_UNITS: &[(&str, &str, f64)] = &[
    ("ml", "ml", 1.0),
    ("millilitre", "ml", 1.0),
    ("millilitres", "ml", 1.0),
    ("milliliter", "ml", 1.0),
    ("milliliters", "ml", 1.0),
    ("cl", "cl", 10.0),
    ("centilitre", "cl", 10.0),
    ("centilitres", "cl", 10.0),
    ("dl", "dl", 100.0),
    ("décilitre", "dl", 100.0),
    ("decilitre", "dl", 100.0),
    ("l", "l", 1000.0),
    ("litre", "l", 1000.0),
    ("litres", "l", 1000.0),
    ("liter", "l", 1000.0),
    ("liters", "l", 1000.0),
    ("fl oz", "fl oz", 29.5735),
];

/// Count unit spellings; all normalize to the same canonical key since a
/// count is a count regardless of the vendor's shorthand.
const COUNT_UNITS: &[&str] = &[
    "unité", "unités", "unite", "unites", "unit", "units", "un", "each", "ea", "pc", "pcs",
    "morceau", "morceaux", "item", "items",
];

lazy_static! {
    static ref TOOL_NOUN_REGEX: Regex = {
        let mut nouns: Vec<&str> = TOOL_NOUNS.iter().map(|(n, _)| *n).collect();
        nouns.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let escaped: Vec<String> = nouns.into_iter().map(regex::escape).collect();
        Regex::new(&format!(r"(?i)^\s*({})s?\b", escaped.join("|")))
            .expect("Tool noun pattern should be valid")
    };
    static ref EMBEDDED_AMOUNT: Regex = Regex::new(
        r"(?i)(\d+(?:[.,]\d+)?)\s*(kg|g|gr|lbs?|oz|ml|cl|l)\b"
    )
    .expect("Embedded amount pattern should be valid");
    static ref TOOL_ABBREVS: HashMap<&'static str, &'static str> =
        TOOL_NOUNS.iter().copied().collect();
    static ref WEIGHT_TABLE: HashMap<&'static str, (&'static str, f64)> = WEIGHT_UNITS
        .iter()
        .map(|(word, key, mult)| (*word, (*key, *mult)))
        .collect();
    static ref VOLUME_TABLE: HashMap<&'static str, (&'static str, f64)> = VOLUME_UNITS
        .iter()
        .map(|(word, key, mult)| (*word, (*key, *mult)))
        .collect();
}

/// A tool/container unit recognized inside a raw unit string
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUnitMatch {
    pub tool_unit: String,
    pub tool_abbrev: String,
    pub weight_g: Option<f64>,
    pub volume_ml: Option<f64>,
}

/// Detect a tool/container unit at the start of a raw unit string
///
/// An embedded weight or volume token after the noun ("caisse 5lb",
/// "bouteille 750ml") is converted to grams/milliliters per container and
/// carried alongside for price normalization. It never changes the unit's
/// classification away from tool.
pub fn detect_tool_unit(unit_str: &str) -> Option<ToolUnitMatch> {
    let caps = TOOL_NOUN_REGEX.captures(unit_str)?;
    let matched = caps[1].to_lowercase();
    let abbrev = TOOL_ABBREVS.get(matched.as_str()).copied().unwrap_or("un");

    let rest = &unit_str[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
    let mut weight_g = None;
    let mut volume_ml = None;
    if let Some(amount_caps) = EMBEDDED_AMOUNT.captures(rest) {
        let amount: f64 = amount_caps[1].replace(',', ".").parse().unwrap_or(0.0);
        let token = amount_caps[2].to_lowercase();
        if let Some((_, grams)) = WEIGHT_TABLE.get(token.as_str()) {
            weight_g = Some(amount * grams);
        } else if let Some((_, mls)) = VOLUME_TABLE.get(token.as_str()) {
            volume_ml = Some(amount * mls);
        }
    }

    trace!(
        unit = %unit_str,
        tool = %matched,
        weight_g = ?weight_g,
        volume_ml = ?volume_ml,
        "Detected tool unit"
    );
    Some(ToolUnitMatch {
        tool_unit: matched,
        tool_abbrev: abbrev.to_string(),
        weight_g,
        volume_ml,
    })
}

/// Classify a raw unit string into its measurement domain
///
/// Precedence is tool > weight > volume > count > unknown. Tool detection is
/// sticky: an embedded weight never downgrades the type to weight.
pub fn classify_unit(unit_str: &str) -> UnitClassification {
    let trimmed = unit_str.trim();
    if trimmed.is_empty() {
        return UnitClassification::unknown();
    }

    if let Some(tool) = detect_tool_unit(trimmed) {
        return UnitClassification {
            unit_type: UnitType::Tool,
            tool_unit: Some(tool.tool_unit),
            tool_abbrev: Some(tool.tool_abbrev),
            base_unit: None,
            weight_g: tool.weight_g,
            volume_ml: tool.volume_ml,
            enforce_metric: false,
        };
    }

    let lowered = trimmed.to_lowercase();
    if let Some((_, grams)) = WEIGHT_TABLE.get(lowered.as_str()) {
        return UnitClassification {
            unit_type: UnitType::Weight,
            tool_unit: None,
            tool_abbrev: None,
            base_unit: Some("g".to_string()),
            weight_g: Some(*grams),
            volume_ml: None,
            enforce_metric: true,
        };
    }
    if let Some((_, mls)) = VOLUME_TABLE.get(lowered.as_str()) {
        return UnitClassification {
            unit_type: UnitType::Volume,
            tool_unit: None,
            tool_abbrev: None,
            base_unit: Some("ml".to_string()),
            weight_g: None,
            volume_ml: Some(*mls),
            enforce_metric: true,
        };
    }
    if COUNT_UNITS.contains(&lowered.as_str()) {
        return UnitClassification {
            unit_type: UnitType::Count,
            tool_unit: None,
            tool_abbrev: None,
            base_unit: Some("unit".to_string()),
            weight_g: None,
            volume_ml: None,
            enforce_metric: false,
        };
    }

    trace!(unit = %trimmed, "Unit string did not classify");
    UnitClassification::unknown()
}

/// Canonical key and domain for a convertible unit string
fn canonical_key(unit: &str) -> Option<(&'static str, UnitType)> {
    let lowered = unit.trim().to_lowercase();
    if let Some(&(key, _)) = WEIGHT_TABLE.get(lowered.as_str()) {
        return Some((key, UnitType::Weight));
    }
    if let Some(&(key, _)) = VOLUME_TABLE.get(lowered.as_str()) {
        return Some((key, UnitType::Volume));
    }
    if COUNT_UNITS.contains(&lowered.as_str()) {
        return Some(("unit", UnitType::Count));
    }
    None
}

/// Grams or milliliters per one canonical unit
fn base_multiplier(key: &str, unit_type: UnitType) -> Option<f64> {
    match unit_type {
        UnitType::Weight => WEIGHT_TABLE.get(key).map(|(_, mult)| *mult),
        UnitType::Volume => VOLUME_TABLE.get(key).map(|(_, mult)| *mult),
        UnitType::Count => Some(1.0),
        _ => None,
    }
}

/// Convert a quantity between two compatible units
///
/// Returns `None` when either unit is unrecognized, the domains differ
/// (weight, volume, and count are never interchangeable), or the quantity is
/// not finite. Same-unit input is returned verbatim without a base-unit round
/// trip, so no-op conversions carry no floating-point drift.
pub fn convert_units(qty: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
    if !qty.is_finite() {
        return None;
    }
    let (from_key, from_type) = canonical_key(from_unit)?;
    let (to_key, to_type) = canonical_key(to_unit)?;
    if from_key == to_key {
        return Some(qty);
    }
    if from_type != to_type {
        debug!(from = %from_unit, to = %to_unit, "Rejected cross-type unit conversion");
        return None;
    }
    let from_mult = base_multiplier(from_key, from_type)?;
    let to_mult = base_multiplier(to_key, to_type)?;
    Some(qty * from_mult / to_mult)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Normalize a price-bearing quantity to price per gram or per milliliter
///
/// `weight` is the purchased amount expressed in `unit`. Tool units use their
/// embedded per-container amount, i.e. the price covers `weight` containers.
/// Non-positive price/weight or an unrecognized unit yields both fields
/// `None` — these figures sit in display paths where a crash is worse than a
/// blank.
pub fn calculate_price_per_unit(price: f64, weight: f64, unit: &str) -> PricePerUnit {
    if !price.is_finite() || !weight.is_finite() || price <= 0.0 || weight <= 0.0 {
        return PricePerUnit::default();
    }

    let classification = classify_unit(unit);
    match classification.unit_type {
        UnitType::Weight => {
            let total_g = weight * classification.weight_g.unwrap_or(0.0);
            if total_g <= 0.0 {
                return PricePerUnit::default();
            }
            PricePerUnit {
                price_per_g: Some(round6(price / total_g)),
                price_per_ml: None,
            }
        }
        UnitType::Volume => {
            let total_ml = weight * classification.volume_ml.unwrap_or(0.0);
            if total_ml <= 0.0 {
                return PricePerUnit::default();
            }
            PricePerUnit {
                price_per_g: None,
                price_per_ml: Some(round6(price / total_ml)),
            }
        }
        UnitType::Tool => match (classification.weight_g, classification.volume_ml) {
            (Some(grams_per_container), None) if grams_per_container > 0.0 => PricePerUnit {
                price_per_g: Some(round6(price / (weight * grams_per_container))),
                price_per_ml: None,
            },
            (None, Some(mls_per_container)) if mls_per_container > 0.0 => PricePerUnit {
                price_per_g: None,
                price_per_ml: Some(round6(price / (weight * mls_per_container))),
            },
            _ => PricePerUnit::default(),
        },
        _ => PricePerUnit::default(),
    }
}

/// Which measurement discipline an inventory item enforces on linked recipe
/// ingredients
///
/// Weight/volume stock enforces metric entry in the canonical unit; tool stock
/// enforces tool entry in the canonical tool noun; count and unrecognized
/// units are dosed by the piece, like tools.
pub fn get_enforced_measurement(item: &InventoryItem) -> EnforcedMeasurement {
    let classification = classify_unit(&item.unit);
    match classification.unit_type {
        UnitType::Weight | UnitType::Volume => {
            let unit = canonical_key(&item.unit)
                .map(|(key, _)| key.to_string())
                .unwrap_or_else(|| item.unit.trim().to_lowercase());
            EnforcedMeasurement {
                discipline: MeasurementDiscipline::Metric,
                unit,
            }
        }
        UnitType::Tool => EnforcedMeasurement {
            discipline: MeasurementDiscipline::Tool,
            unit: classification
                .tool_unit
                .unwrap_or_else(|| item.unit.trim().to_lowercase()),
        },
        UnitType::Count | UnitType::Unknown => EnforcedMeasurement {
            discipline: MeasurementDiscipline::Tool,
            unit: item.unit.trim().to_lowercase(),
        },
    }
}
