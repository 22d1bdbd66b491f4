//! # Vendor Packaging Format Parsing
//!
//! This module turns the "format" column of Quebec food-supplier invoices
//! (e.g. `10/100`, `1/500`, `6/RL`) plus free-text product descriptions into
//! structured packaging metadata: units per case, rolls per case, container
//! capacity, and product dimensions.
//!
//! Invoice text is adversarial by nature — OCR noise, vendor shorthand,
//! bilingual abbreviations — so nothing in this module ever fails. Unmatched
//! patterns degrade to `Unknown`/`None` results that callers flag for human
//! review instead of blocking ingestion.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// How an invoice line's case packaging is structured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingType {
    /// `X/Y` with X > 1: X packs of Y units each
    NestedUnits,
    /// `1/Y` or a bare count: one case of Y units
    Simple,
    /// `X/RL`: X rolls per case
    Rolls,
    /// Unrecognized format; the case still counts as one unit
    Unknown,
}

/// Structured packaging metadata for one invoice line
///
/// `total_units_per_case` is the single authoritative scalar for "how many
/// atomic units does one case contain" and is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingDescriptor {
    pub packaging_type: PackagingType,
    pub pack_count: Option<f64>,
    pub units_per_pack: Option<f64>,
    pub total_units_per_case: f64,
    pub rolls_per_case: Option<f64>,
    pub length_per_roll: Option<f64>,
    pub length_unit: Option<String>,
}

impl PackagingDescriptor {
    fn unknown() -> Self {
        Self {
            packaging_type: PackagingType::Unknown,
            pack_count: None,
            units_per_pack: None,
            // A degenerate invoice line still counts as at least one case
            total_units_per_case: 1.0,
            rolls_per_case: None,
            length_per_roll: None,
            length_unit: None,
        }
    }
}

/// What kind of container a capacity was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    Container,
    Lid,
    Bowl,
    Cup,
}

/// How much food a container product holds (e.g. "CONTENANT ALUM. 2.25LB")
///
/// Only emitted when the description names a container noun AND carries a
/// trailing weight/volume token — this is what distinguishes "holds 2.25 lb"
/// from "case of 2.25 units" or a dimension like "8X8".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerCapacity {
    pub capacity: f64,
    pub unit: String,
    pub is_capacity: bool,
    pub container_type: ContainerType,
}

/// Dimension and spec annotations extracted from a product description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDimensions {
    /// `WxH`-style token, e.g. "8X8" or "35X50"
    pub dimensions: Option<String>,
    /// Trailing spec tokens, e.g. "3COMP", "2PLY", "BLK"
    pub specs: Vec<String>,
}

/// One invoice line as delivered by the extraction collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub quantity: f64,
}

/// Full packaging analysis of one invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingInfo {
    #[serde(flatten)]
    pub descriptor: PackagingDescriptor,
    pub container_capacity: Option<ContainerCapacity>,
    pub product_dimensions: ProductDimensions,
    pub is_linear: bool,
    /// `total_units_per_case * quantity`
    pub calculated_total_units: f64,
    /// For roll products with a known length: `quantity * rolls * length`
    pub calculated_total_length: Option<f64>,
}

lazy_static! {
    // Format-column classifiers, tried in cascade order (see match_format)
    static ref ROLL_FORMAT: Regex =
        Regex::new(r"(?i)^\s*(\d+)\s*/\s*rl\s*$").expect("Roll format pattern should be valid");
    static ref SPLIT_FORMAT: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\s*$")
            .expect("Split format pattern should be valid");
    static ref BARE_FORMAT: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*$").expect("Bare format pattern should be valid");

    // Description annotations
    static ref ROLL_LENGTH: Regex =
        Regex::new(r#"(\d+(?:\.\d+)?)\s*""#).expect("Roll length pattern should be valid");
    static ref CONTAINER_NOUN: Regex =
        Regex::new(r"(?i)\b(couvercles?|contenants?|bols?|verres?)\b")
            .expect("Container noun pattern should be valid");
    static ref CAPACITY_TOKEN: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(lbs?|oz|kg|g|ml|l|litres?)\b")
            .expect("Capacity token pattern should be valid");
    static ref DIMENSION_TOKEN: Regex =
        Regex::new(r"\b(\d+(?:\.\d+)?[xX]\d+(?:\.\d+)?)\b")
            .expect("Dimension token pattern should be valid");
    static ref SPEC_TOKEN: Regex =
        Regex::new(r"(?i)\b(\d+comp|\d+ply|blk|kraft|rect|rond|hvy)\b")
            .expect("Spec token pattern should be valid");
    static ref LINEAR_NOUN: Regex =
        Regex::new(r"(?i)\b(papiers?|films?|pellicules?)\b")
            .expect("Linear noun pattern should be valid");
    static ref MATERIAL_WORD: Regex =
        Regex::new(r"(?i)\b(aluminium|alum|alu)\b").expect("Material pattern should be valid");
    static ref ROLL_WORD: Regex =
        Regex::new(r"(?i)\b(rouleaux?|rolls?|rl)\b").expect("Roll word pattern should be valid");
}

/// Recognized shapes of the invoice format column
#[derive(Debug, Clone, Copy, PartialEq)]
enum FormatMatch {
    Rolls(f64),
    Nested(f64, f64),
    Simple(f64),
    Unknown,
}

/// Classify the format column through the ordered regex cascade.
///
/// Roll notation is tried first so `6/RL` is never read as a split count;
/// `X/Y` with X > 1 is nested packaging; `1/Y` and bare numbers are simple.
fn match_format(format: &str) -> FormatMatch {
    if let Some(caps) = ROLL_FORMAT.captures(format) {
        let rolls: f64 = caps[1].parse().unwrap_or(1.0);
        return FormatMatch::Rolls(rolls.max(1.0));
    }
    if let Some(caps) = SPLIT_FORMAT.captures(format) {
        let packs: f64 = caps[1].parse().unwrap_or(1.0);
        let per_pack: f64 = caps[2].parse().unwrap_or(1.0);
        if packs > 1.0 {
            return FormatMatch::Nested(packs, per_pack);
        }
        return FormatMatch::Simple(per_pack);
    }
    if let Some(caps) = BARE_FORMAT.captures(format) {
        let count: f64 = caps[1].parse().unwrap_or(1.0);
        return FormatMatch::Simple(count);
    }
    FormatMatch::Unknown
}

/// Parse the invoice format column into a packaging descriptor
///
/// The description is consulted only for roll products, where an embedded
/// inch token (e.g. `12"`) gives the per-roll length. The length unit is
/// reported as `"ft"` — a domain convention for wax-paper-style goods, not
/// something derivable from the quoted-inch token itself.
pub fn parse_container_format(format: &str, description: &str) -> PackagingDescriptor {
    let descriptor = match match_format(format) {
        FormatMatch::Rolls(rolls) => {
            let length = ROLL_LENGTH
                .captures(description)
                .and_then(|caps| caps[1].parse::<f64>().ok());
            PackagingDescriptor {
                packaging_type: PackagingType::Rolls,
                pack_count: Some(rolls),
                units_per_pack: Some(1.0),
                // Each roll counts as one saleable unit for case-quantity math
                total_units_per_case: rolls,
                rolls_per_case: Some(rolls),
                length_per_roll: length,
                length_unit: length.map(|_| "ft".to_string()),
            }
        }
        FormatMatch::Nested(packs, per_pack) => PackagingDescriptor {
            packaging_type: PackagingType::NestedUnits,
            pack_count: Some(packs),
            units_per_pack: Some(per_pack),
            total_units_per_case: (packs * per_pack).max(1.0),
            rolls_per_case: None,
            length_per_roll: None,
            length_unit: None,
        },
        FormatMatch::Simple(count) => PackagingDescriptor {
            packaging_type: PackagingType::Simple,
            pack_count: Some(1.0),
            units_per_pack: Some(count),
            total_units_per_case: count.max(1.0),
            rolls_per_case: None,
            length_per_roll: None,
            length_unit: None,
        },
        FormatMatch::Unknown => {
            trace!(format = %format, "Unrecognized packaging format, defaulting to one unit per case");
            PackagingDescriptor::unknown()
        }
    };
    debug!(
        format = %format,
        packaging_type = ?descriptor.packaging_type,
        total_units = descriptor.total_units_per_case,
        "Parsed container format"
    );
    descriptor
}

/// Whether the description names a container product (contenant, couvercle,
/// bol, verre). Gates capacity extraction so dimension numbers on
/// non-container goods are never read as capacities.
pub fn is_container_product(description: &str) -> bool {
    CONTAINER_NOUN.is_match(description)
}

/// Extract the held capacity of a container product, if any
///
/// Requires both a container noun and a trailing weight/volume token: a bare
/// dimension like "CONTENANT CLAM 8X8" yields `None`, and a non-container
/// product ("GANTS NITRILE M") never yields a capacity at all.
pub fn extract_container_capacity(description: &str) -> Option<ContainerCapacity> {
    let noun = CONTAINER_NOUN.captures(description)?;
    let container_type = match noun[1].to_lowercase().as_str() {
        s if s.starts_with("couvercle") => ContainerType::Lid,
        s if s.starts_with("bol") => ContainerType::Bowl,
        s if s.starts_with("verre") => ContainerType::Cup,
        _ => ContainerType::Container,
    };
    let caps = CAPACITY_TOKEN.captures(description)?;
    let capacity: f64 = caps[1].parse().ok()?;
    let unit = caps[2].to_lowercase();
    debug!(
        description = %description,
        capacity = capacity,
        unit = %unit,
        "Extracted container capacity"
    );
    Some(ContainerCapacity {
        capacity,
        unit,
        is_capacity: true,
        container_type,
    })
}

/// Extract `WxH` dimension tokens and trailing spec tokens from a description
///
/// These are orthogonal annotations on the same text as the capacity/format
/// logic, not alternatives to it.
pub fn extract_product_dimensions(description: &str) -> ProductDimensions {
    let dimensions = DIMENSION_TOKEN
        .captures(description)
        .map(|caps| caps[1].to_uppercase());
    let specs: Vec<String> = SPEC_TOKEN
        .captures_iter(description)
        .map(|caps| caps[1].to_uppercase())
        .collect();
    ProductDimensions { dimensions, specs }
}

/// Whether the product is a roll/linear good (paper, film, foil rolls)
///
/// Either a dedicated linear noun matches, or BOTH a material word and a
/// roll word do — the conjunctive rule keeps "COUVERCLE ALUM." (an aluminum
/// lid) from being classified as linear.
pub fn is_linear_product(description: &str) -> bool {
    if LINEAR_NOUN.is_match(description) {
        return true;
    }
    MATERIAL_WORD.is_match(description) && ROLL_WORD.is_match(description)
}

/// Full packaging analysis for one invoice line
///
/// Composes format parsing, capacity extraction, dimension extraction, and
/// linear classification, then multiplies per-case units by the line quantity.
pub fn parse_packaging_info(line: &InvoiceLine) -> PackagingInfo {
    let quantity = if line.quantity.is_finite() && line.quantity >= 0.0 {
        line.quantity
    } else {
        warn!(
            quantity = line.quantity,
            description = %line.description,
            "Invalid invoice line quantity, coercing to zero"
        );
        0.0
    };

    let descriptor = parse_container_format(&line.format, &line.description);
    let container_capacity = extract_container_capacity(&line.description);
    let product_dimensions = extract_product_dimensions(&line.description);
    let is_linear = is_linear_product(&line.description);

    let calculated_total_units = descriptor.total_units_per_case * quantity;
    let calculated_total_length = match (descriptor.rolls_per_case, descriptor.length_per_roll) {
        (Some(rolls), Some(length)) => Some(quantity * rolls * length),
        _ => None,
    };

    PackagingInfo {
        descriptor,
        container_capacity,
        product_dimensions,
        is_linear,
        calculated_total_units,
        calculated_total_length,
    }
}
