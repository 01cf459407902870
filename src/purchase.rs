use crate::error::LoadError;
use crate::input::parse_numeric;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// Opaque identity of a purchase row. Only used to address updates and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PurchaseId(u64);

impl PurchaseId {
    pub(crate) fn new(raw: u64) -> Self {
        PurchaseId(raw)
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two editable columns of a purchase row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Units,
    Price,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Units => "Units",
            Field::Price => "Price",
        }
    }

    pub fn other(self) -> Field {
        match self {
            Field::Units => Field::Price,
            Field::Price => Field::Units,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field value is either a number or the text a user is still typing.
///
/// JSON numbers load as `Parsed`, JSON strings as `RawText`. The empty text
/// means "not entered yet" and counts as zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Parsed(f64),
    RawText(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::RawText(String::new())
    }
}

impl FieldValue {
    /// Numeric value of the field. May be NaN or infinite for bad text.
    pub fn numeric(&self) -> f64 {
        match self {
            FieldValue::Parsed(v) => *v,
            FieldValue::RawText(s) => parse_numeric(s),
        }
    }

    /// Numeric value with anything non-finite counted as zero.
    pub fn finite_or_zero(&self) -> f64 {
        let v = self.numeric();
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /// The value as editable text.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Parsed(v) => Cow::Owned(v.to_string()),
            FieldValue::RawText(s) => Cow::Borrowed(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::RawText(s) if s.is_empty())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Parsed(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::RawText(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::RawText(s)
    }
}

/// One buy transaction: how many units were bought and at what price each.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseEntry {
    id: PurchaseId,
    pub units: FieldValue,
    pub price: FieldValue,
}

impl PurchaseEntry {
    pub(crate) fn new(id: PurchaseId, units: FieldValue, price: FieldValue) -> Self {
        PurchaseEntry { id, units, price }
    }

    pub fn id(&self) -> PurchaseId {
        self.id
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::Units => &self.units,
            Field::Price => &self.price,
        }
    }

    /// Invested amount of this row, zero when either side is not a finite number.
    pub fn amount(&self) -> f64 {
        let amount = self.units.numeric() * self.price.numeric();
        if amount.is_finite() {
            amount
        } else {
            0.0
        }
    }
}

/// A purchase as it appears in a purchases file, before it gets an id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseDraft {
    #[serde(default)]
    pub units: FieldValue,
    #[serde(default)]
    pub price: FieldValue,
}

pub fn from_string(data: &str) -> Result<Vec<PurchaseDraft>, LoadError> {
    Ok(serde_json::from_str::<Vec<PurchaseDraft>>(data)?)
}

pub fn from_file(filename: &str) -> Result<Vec<PurchaseDraft>, LoadError> {
    let data = std::fs::read_to_string(filename).map_err(|source| LoadError::Io {
        path: filename.to_string(),
        source,
    })?;
    from_string(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_field_values() {
        let drafts =
            from_string(r#"[{"Units": 10, "Price": "50.5"}, {"Units": "1."}, {}]"#).unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].units, FieldValue::Parsed(10.0));
        assert_eq!(drafts[0].price, FieldValue::RawText("50.5".to_string()));
        assert_eq!(drafts[1].units, FieldValue::RawText("1.".to_string()));
        assert!(drafts[1].price.is_empty());
        assert!(drafts[2].units.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(matches!(from_string("{"), Err(LoadError::Json(_))));
        assert!(matches!(
            from_file("does/not/exist.json"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FieldValue::default().numeric(), 0.0);
        assert_eq!(FieldValue::from("10.").numeric(), 10.0);
        assert_eq!(FieldValue::from(2.5).numeric(), 2.5);
        assert!(FieldValue::from("abc").numeric().is_nan());
        assert_eq!(FieldValue::from("abc").finite_or_zero(), 0.0);
    }

    #[test]
    fn test_text_of_parsed_value() {
        assert_eq!(FieldValue::from(10.0).text(), "10");
        assert_eq!(FieldValue::from(0.25).text(), "0.25");
        assert_eq!(FieldValue::from("1.").text(), "1.");
    }

    #[test]
    fn test_amount_is_zero_for_bad_input() {
        let entry = PurchaseEntry::new(PurchaseId::new(1), "abc".into(), 3.0.into());
        assert_eq!(entry.amount(), 0.0);
        let entry = PurchaseEntry::new(PurchaseId::new(2), "4".into(), "2.5".into());
        assert_eq!(entry.amount(), 10.0);
    }
}
