//! SCN amount totals
//!
//! `calculate_total_for_scn` sums `noticees[].total_amount`, a field the
//! editor never writes; amounts entered through the form live one level
//! deeper under `noticees[].amounts[]`. Which of the two totals the list view
//! should show is an open product decision, so both are exposed.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Total does not fit in a [`Decimal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TotalError {
    /// Running sum passed `Decimal::MAX` (or `Decimal::MIN`)
    #[error("amount total overflowed")]
    Overflow,
}

/// Sum of `noticees[].total_amount`; absent or unparseable entries count as zero
///
/// # Errors
/// `Overflow` if the sum does not fit in a decimal.
pub fn calculate_total_for_scn(scn: &Value) -> Result<Decimal, TotalError> {
    checked_sum(noticees(scn).filter_map(|noticee| noticee.get("total_amount").and_then(decimal_of)))
}

/// Sum of `noticees[].amounts[].amount`
///
/// # Errors
/// `Overflow` if the sum does not fit in a decimal.
pub fn nested_amount_total(scn: &Value) -> Result<Decimal, TotalError> {
    checked_sum(
        noticees(scn)
            .flat_map(|noticee| {
                noticee
                    .get("amounts")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
            })
            .filter_map(|amount| amount.get("amount").and_then(decimal_of)),
    )
}

/// [`calculate_total_for_scn`] over a list view
///
/// # Errors
/// `Overflow` if any record's total, or the grand total, does not fit.
pub fn list_total(scns: &[Value]) -> Result<Decimal, TotalError> {
    scns.iter()
        .try_fold(Decimal::ZERO, |acc, scn| {
            acc.checked_add(calculate_total_for_scn(scn)?)
                .ok_or(TotalError::Overflow)
        })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, TotalError> {
    amounts
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or_else(|| {
            tracing::warn!("amount total overflowed");
            TotalError::Overflow
        })
}

fn noticees(scn: &Value) -> impl Iterator<Item = &Value> {
    scn.get("noticees")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn decimal_of(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let parsed = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text));
    if parsed.is_err() {
        tracing::debug!(value = %text, "ignoring non-numeric amount");
    }
    parsed.ok()
}
