//! # Quebec Compound Tax Calculation and Validation
//!
//! Quebec sales tax cascades: TPS (GST, 5%) applies to the subtotal, and TVQ
//! (QST, 9.975%) applies to the subtotal *plus* TPS. Applying the nominal TVQ
//! rate to the bare subtotal understates the correct tax — that compound rule
//! is the core domain fact this module guards.
//!
//! Validation compares AI-extracted invoice tax fields against computed
//! expectations inside a tolerance band and reports typed, severity-tagged
//! anomalies. Anomalies are returned, never thrown: an `error` mismatch goes
//! to a human reviewer but does not block invoice storage, and a tax-exempt
//! invoice is flagged at `info` because it is legitimate, just worth a look.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Federal GST rate applied to the subtotal
pub const TPS_RATE: f64 = 0.05;
/// Quebec QST rate applied to subtotal + TPS
pub const TVQ_RATE: f64 = 0.09975;
/// Effective combined rate under the cascade: 5% + 105% of 9.975%
pub const COMBINED_RATE: f64 = TPS_RATE + (1.0 + TPS_RATE) * TVQ_RATE;

/// Severity of a validation anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Typed anomaly categories surfaced by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    TpsMismatch,
    TvqMismatch,
    TaxExempt,
    SubtotalMismatch,
    CombinedTaxMismatch,
    TotalMismatch,
}

/// One validation finding, reported alongside otherwise-successful results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub note: String,
}

impl Anomaly {
    fn new(kind: AnomalyKind, severity: Severity, note: String) -> Self {
        Self {
            kind,
            severity,
            note,
        }
    }
}

/// Computed Quebec taxes for a subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuebecTaxes {
    pub tps: f64,
    pub tvq: f64,
    pub total: f64,
    pub combined_rate: f64,
}

impl QuebecTaxes {
    fn zero() -> Self {
        Self {
            tps: 0.0,
            tvq: 0.0,
            total: 0.0,
            combined_rate: COMBINED_RATE,
        }
    }
}

/// Validation of extracted tax fields against computed expectations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxValidation {
    pub tps: f64,
    pub tvq: f64,
    pub total: f64,
    pub combined_rate: f64,
    pub tps_valid: bool,
    pub tvq_valid: bool,
    pub has_anomalies: bool,
    pub is_tax_exempt: bool,
    pub anomalies: Vec<Anomaly>,
}

/// Invoice-level totals as delivered by the extraction collaborator
///
/// Modern invoices split TPS/TVQ; legacy rows carry a single combined
/// `tax_amount` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: f64,
    #[serde(default, rename = "taxGST")]
    pub tax_gst: Option<f64>,
    #[serde(default, rename = "taxQST")]
    pub tax_qst: Option<f64>,
    #[serde(default)]
    pub tax_amount: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

/// Invoice-level validation: tax checks plus subtotal/grand-total checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsValidation {
    pub tax: TaxValidation,
    pub subtotal_valid: bool,
    pub anomalies: Vec<Anomaly>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Relative-or-absolute tolerance for comparing a monetary amount against its
/// expected value
///
/// 0.5% of the expected amount with a $0.02 floor; the floor prevents false
/// mismatches on tiny invoices where 0.5% would be sub-cent. Keying the band
/// to the expected amount (not the subtotal) keeps a naive non-compound TVQ —
/// which differs from the correct figure by just under 0.5% of the subtotal —
/// from slipping through.
fn tolerance_for(expected: f64) -> f64 {
    (expected.abs() * 0.005).max(0.02)
}

/// Compute Quebec taxes on a subtotal using the compound rule
///
/// TPS is 5% of the subtotal; TVQ is 9.975% of subtotal + TPS. Each component
/// is rounded to 2 decimals independently before summing. Zero or negative
/// subtotal short-circuits to an all-zero result — there is no negative tax.
pub fn calculate_quebec_taxes(subtotal: f64) -> QuebecTaxes {
    let subtotal = sanitize(subtotal);
    if subtotal <= 0.0 {
        return QuebecTaxes::zero();
    }
    let tps = round2(subtotal * TPS_RATE);
    let tvq = round2((subtotal + tps) * TVQ_RATE);
    QuebecTaxes {
        tps,
        tvq,
        total: round2(tps + tvq),
        combined_rate: COMBINED_RATE,
    }
}

/// Validate extracted TPS/TVQ amounts against computed expectations
///
/// Both actuals at zero on a positive subtotal means a tax-exempt invoice:
/// flagged at `info` severity, not reported as a mismatch. Out-of-tolerance
/// components produce `error`-severity mismatch anomalies.
pub fn validate_quebec_taxes(subtotal: f64, actual_tps: f64, actual_tvq: f64) -> TaxValidation {
    let subtotal = sanitize(subtotal);
    let actual_tps = sanitize(actual_tps);
    let actual_tvq = sanitize(actual_tvq);

    let expected = calculate_quebec_taxes(subtotal);
    let tps_tolerance = tolerance_for(expected.tps);
    let tvq_tolerance = tolerance_for(expected.tvq);
    let mut anomalies = Vec::new();

    let is_tax_exempt = subtotal > 0.0 && actual_tps == 0.0 && actual_tvq == 0.0;
    let (tps_valid, tvq_valid) = if is_tax_exempt {
        anomalies.push(Anomaly::new(
            AnomalyKind::TaxExempt,
            Severity::Info,
            "Invoice carries no TPS/TVQ; verify the supplier is tax-exempt".to_string(),
        ));
        (true, true)
    } else {
        let tps_valid = (actual_tps - expected.tps).abs() <= tps_tolerance;
        let tvq_valid = (actual_tvq - expected.tvq).abs() <= tvq_tolerance;
        if !tps_valid {
            warn!(
                expected = expected.tps,
                actual = actual_tps,
                tolerance = tps_tolerance,
                "TPS outside tolerance"
            );
            anomalies.push(Anomaly::new(
                AnomalyKind::TpsMismatch,
                Severity::Error,
                format!(
                    "TPS {:.2} differs from expected {:.2} (tolerance {:.2})",
                    actual_tps, expected.tps, tps_tolerance
                ),
            ));
        }
        if !tvq_valid {
            warn!(
                expected = expected.tvq,
                actual = actual_tvq,
                tolerance = tvq_tolerance,
                "TVQ outside tolerance"
            );
            anomalies.push(Anomaly::new(
                AnomalyKind::TvqMismatch,
                Severity::Error,
                format!(
                    "TVQ {:.2} differs from expected {:.2} (tolerance {:.2}); \
                     TVQ applies to subtotal plus TPS",
                    actual_tvq, expected.tvq, tvq_tolerance
                ),
            ));
        }
        (tps_valid, tvq_valid)
    };

    debug!(
        subtotal = subtotal,
        tps_valid = tps_valid,
        tvq_valid = tvq_valid,
        is_tax_exempt = is_tax_exempt,
        "Validated Quebec taxes"
    );

    TaxValidation {
        tps: expected.tps,
        tvq: expected.tvq,
        total: expected.total,
        combined_rate: expected.combined_rate,
        tps_valid,
        tvq_valid,
        has_anomalies: !anomalies.is_empty(),
        is_tax_exempt,
        anomalies,
    }
}

/// Validate invoice-level totals
///
/// Checks the stated subtotal against the sum of line items (when supplied),
/// validates split TPS/TVQ fields or a legacy combined `tax_amount`, and
/// cross-checks the stated grand total. All findings are reported as
/// anomalies; invoice storage is never blocked.
pub fn validate_totals(
    totals: &InvoiceTotals,
    calculated_subtotal: Option<f64>,
) -> TotalsValidation {
    let subtotal = sanitize(totals.subtotal);
    let mut anomalies = Vec::new();

    let subtotal_valid = match calculated_subtotal {
        Some(line_sum) => {
            let line_sum = sanitize(line_sum);
            let valid = (subtotal - line_sum).abs() <= tolerance_for(line_sum);
            if !valid {
                anomalies.push(Anomaly::new(
                    AnomalyKind::SubtotalMismatch,
                    Severity::Error,
                    format!(
                        "Stated subtotal {:.2} differs from line-item sum {:.2}",
                        subtotal, line_sum
                    ),
                ));
            }
            valid
        }
        None => true,
    };

    let tax = match (totals.tax_gst, totals.tax_qst) {
        (Some(tps), Some(tvq)) => validate_quebec_taxes(subtotal, tps, tvq),
        _ => {
            // Legacy shape: one combined tax figure instead of split TPS/TVQ
            let expected = calculate_quebec_taxes(subtotal);
            let actual = sanitize(totals.tax_amount.unwrap_or(0.0));
            let tolerance = tolerance_for(expected.total);
            let mut tax_anomalies = Vec::new();
            let is_tax_exempt = subtotal > 0.0 && actual == 0.0;
            let combined_valid = if is_tax_exempt {
                tax_anomalies.push(Anomaly::new(
                    AnomalyKind::TaxExempt,
                    Severity::Info,
                    "Invoice carries no tax amount; verify the supplier is tax-exempt"
                        .to_string(),
                ));
                true
            } else {
                let valid = (actual - expected.total).abs() <= tolerance;
                if !valid {
                    tax_anomalies.push(Anomaly::new(
                        AnomalyKind::CombinedTaxMismatch,
                        Severity::Error,
                        format!(
                            "Combined tax {:.2} differs from expected {:.2} (tolerance {:.2})",
                            actual, expected.total, tolerance
                        ),
                    ));
                }
                valid
            };
            TaxValidation {
                tps: expected.tps,
                tvq: expected.tvq,
                total: expected.total,
                combined_rate: expected.combined_rate,
                tps_valid: combined_valid,
                tvq_valid: combined_valid,
                has_anomalies: !tax_anomalies.is_empty(),
                is_tax_exempt,
                anomalies: tax_anomalies,
            }
        }
    };

    if let Some(stated_total) = totals.total_amount {
        let stated_total = sanitize(stated_total);
        let actual_tax = totals
            .tax_gst
            .map(sanitize)
            .unwrap_or(0.0)
            + totals.tax_qst.map(sanitize).unwrap_or(0.0)
            + totals.tax_amount.map(sanitize).unwrap_or(0.0);
        let expected_total = round2(subtotal + actual_tax);
        if (stated_total - expected_total).abs() > tolerance_for(expected_total) {
            anomalies.push(Anomaly::new(
                AnomalyKind::TotalMismatch,
                Severity::Warning,
                format!(
                    "Stated total {:.2} differs from subtotal plus taxes {:.2}",
                    stated_total, expected_total
                ),
            ));
        }
    }

    TotalsValidation {
        tax,
        subtotal_valid,
        anomalies,
    }
}
