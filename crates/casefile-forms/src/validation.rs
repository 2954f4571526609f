//! Pre-submit field checks
//!
//! Every scalar leaf is checked against its [`FieldSpec`]. Nothing here
//! rewrites values; offending paths are returned for highlighting.

use casefile_record::{FieldKind, FieldPath, FieldSpec, SubRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// What is wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Problem {
    /// Required field is blank
    Required,
    /// Amount field is not a decimal number
    NotAnAmount,
    /// Date field is not `YYYY-MM-DD`
    NotADate,
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "is required",
            Self::NotAnAmount => "must be a number",
            Self::NotADate => "must be a date (YYYY-MM-DD)",
        })
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIssue {
    /// Field location
    pub path: FieldPath,
    /// What is wrong
    pub problem: Problem,
}

impl FieldIssue {
    /// Create new issue
    #[inline]
    #[must_use]
    pub fn new(path: FieldPath, problem: Problem) -> Self {
        Self { path, problem }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.problem)
    }
}

/// Check every leaf of `root`
#[must_use]
pub fn validate(root: &SubRecord) -> Vec<FieldIssue> {
    root.leaves()
        .into_iter()
        .filter_map(|leaf| check(leaf.spec, leaf.value).map(|p| FieldIssue::new(leaf.path, p)))
        .collect()
}

fn check(spec: &FieldSpec, value: &str) -> Option<Problem> {
    let value = value.trim();
    if value.is_empty() {
        return spec.is_required().then_some(Problem::Required);
    }
    match spec.kind() {
        FieldKind::Amount if !is_amount(value) => Some(Problem::NotAnAmount),
        FieldKind::Date if !is_date(value) => Some(Problem::NotADate),
        _ => None,
    }
}

/// Whether `text` parses as a decimal amount
#[must_use]
pub fn is_amount(text: &str) -> bool {
    Decimal::from_str(text.trim()).is_ok()
}

/// Whether `text` is a calendar date in `YYYY-MM-DD` form
#[must_use]
pub fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_record::{CollectionPath, RecordShape};

    fn shape() -> std::sync::Arc<RecordShape> {
        let amount = RecordShape::builder("amount")
            .required_text("amount_type")
            .amount("amount", true)
            .text("description")
            .build();
        RecordShape::builder("noticee")
            .required_text("name_of_noticee")
            .date("served_on", false)
            .collection("amounts", amount)
            .build()
    }

    #[test]
    fn blank_required_fields_are_reported() {
        let record = SubRecord::default_for(&shape());
        let issues = validate(&record);
        let paths: Vec<String> = issues.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(
            paths,
            vec!["name_of_noticee", "amounts[0].amount_type", "amounts[0].amount"]
        );
        assert!(issues.iter().all(|i| i.problem == Problem::Required));
    }

    #[test]
    fn formats_are_checked_when_filled() {
        let amounts = CollectionPath::root("amounts");
        let record = SubRecord::default_for(&shape())
            .set(&FieldPath::root("name_of_noticee"), "M/s Kiran Traders")
            .unwrap()
            .set(&FieldPath::root("served_on"), "31/01/2024")
            .unwrap()
            .update(&amounts, 0, "amount_type", "Tax")
            .unwrap()
            .update(&amounts, 0, "amount", "1,50,000")
            .unwrap();

        let issues = validate(&record);
        assert_eq!(
            issues,
            vec![
                FieldIssue::new(FieldPath::root("served_on"), Problem::NotADate),
                FieldIssue::new(amounts.field(0, "amount"), Problem::NotAnAmount),
            ]
        );
        assert_eq!(
            issues[1].to_string(),
            "amounts[0].amount must be a number"
        );
    }

    #[test]
    fn valid_record_passes() {
        let amounts = CollectionPath::root("amounts");
        let record = SubRecord::default_for(&shape())
            .set(&FieldPath::root("name_of_noticee"), "A")
            .unwrap()
            .update(&amounts, 0, "amount_type", "Penalty")
            .unwrap()
            .update(&amounts, 0, "amount", " 150000.50 ")
            .unwrap();
        assert!(validate(&record).is_empty());
    }

    #[test]
    fn amount_and_date_helpers() {
        assert!(is_amount("0"));
        assert!(is_amount("-12.5"));
        assert!(!is_amount("12a"));
        assert!(is_date("2024-02-29"));
        assert!(!is_date("2023-02-29"));
        assert!(!is_date("2024-2-3x"));
    }
}
