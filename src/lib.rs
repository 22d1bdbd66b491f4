//! # Kitchen Parsing
//!
//! Domain parsing and normalization engine for a restaurant back-of-house
//! application: converts noisy, locale-specific, voice-dictated, or
//! invoice-scanned text into structured, unit-consistent data.
//!
//! Four independent, composable transformation libraries with no shared
//! mutable state:
//!
//! - [`measurement`] — French spoken-measurement parsing ("deux grammes" →
//!   "2g"), backed by the [`number_words`] resolver
//! - [`packaging`] — vendor invoice format/description parsing ("10/100",
//!   "6/RL") into packaging metadata
//! - [`units`] — unit classification, conversion, and price-per-base-unit
//!   normalization
//! - [`taxes`] — compound Quebec tax (TPS/TVQ) calculation and
//!   tolerance-based invoice validation
//!
//! Everything is synchronous and pure: no I/O, no database, no network. The
//! lookup tables are immutable module constants, so any component may be
//! called from concurrent call sites without coordination.

pub mod errors;
pub mod measurement;
pub mod number_words;
pub mod packaging;
pub mod taxes;
pub mod units;

// Re-export types for easier access
pub use errors::{AppError, AppResult};
pub use measurement::{IngredientField, MeasurementParser, ParseOutcome};
pub use number_words::NumberWordResolver;
pub use packaging::{
    parse_container_format, parse_packaging_info, InvoiceLine, PackagingDescriptor, PackagingInfo,
    PackagingType,
};
pub use taxes::{
    calculate_quebec_taxes, validate_quebec_taxes, validate_totals, Anomaly, AnomalyKind,
    InvoiceTotals, QuebecTaxes, Severity, TaxValidation,
};
pub use units::{
    calculate_price_per_unit, classify_unit, convert_units, get_enforced_measurement,
    InventoryItem, UnitClassification, UnitType,
};
