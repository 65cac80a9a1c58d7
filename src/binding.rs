//! Field binding rules: which form field receives which text.
//!
//! A [`FieldBindingSpec`] splits fields into three groups:
//!
//! * **static** fields hold a value that is the same for every row of a run
//!   (a manufacturer name, a signer, today's date). They are written once,
//!   before the first row.
//! * **dynamic** fields are recomputed from each row by positional cell
//!   lookup plus an optional [`Transform`].
//! * **required** fields are only checked for existence once per run and
//!   keep whatever the template holds.
//!
//! The loaded template document is reused across rows, so a value written for
//! row N stays in the form until row N+1 overwrites it. Every field that must
//! vary per row therefore has to be a dynamic binding.
//!
//! Specs are `serde` (de)serialisable so custom bindings can live in a JSON
//! file next to the template:
//!
//! ```json
//! {
//!   "static_fields": [
//!     { "field": "Manufacturer", "value": { "text": "The Glynwood Center" } },
//!     { "field": "Date", "value": { "current_date": { "format": "%m/%d/%y" } } }
//!   ],
//!   "dynamic_fields": [
//!     { "field": "ProductName", "column": 0, "transform": "uppercase" }
//!   ]
//! }
//! ```

use crate::error::Csv2PdfError;
use crate::pipeline::records::Row;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;
use std::path::Path;

/// The full set of field bindings for one pipeline variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBindingSpec {
    /// Fields written once per run.
    #[serde(default)]
    pub static_fields: Vec<StaticBinding>,
    /// Fields written for every row.
    #[serde(default)]
    pub dynamic_fields: Vec<DynamicBinding>,
    /// Fields that must exist on the form but are never written.
    #[serde(default)]
    pub required_fields: Vec<String>,
}

/// A field whose value never changes during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticBinding {
    pub field: String,
    pub value: StaticValue,
}

/// The value of a static field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticValue {
    /// Literal text, written verbatim.
    Text(String),
    /// The run date rendered with a `chrono` strftime pattern, e.g. `%m/%d/%y`.
    CurrentDate { format: String },
}

impl StaticValue {
    /// Render the value for a run taking place on `today`.
    ///
    /// Fails for a date format that needs a time or an offset (`%H`, `%z`).
    pub fn resolve(&self, today: NaiveDate) -> Result<String, Csv2PdfError> {
        match self {
            StaticValue::Text(s) => Ok(s.clone()),
            StaticValue::CurrentDate { format } => {
                format_date(today, format).map_err(Csv2PdfError::InvalidConfig)
            }
        }
    }
}

/// A specifier a bare date cannot fill surfaces as `fmt::Error` from `chrono`.
fn format_date(day: NaiveDate, format: &str) -> Result<String, String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("Invalid date format '{format}'"));
    }
    let mut out = String::new();
    write!(out, "{}", day.format(format))
        .map_err(|_| format!("Date format '{format}' needs a time or timezone"))?;
    Ok(out)
}

/// A field filled from one cell of each row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicBinding {
    pub field: String,
    /// Zero-based cell position in the row.
    pub column: usize,
    #[serde(default)]
    pub transform: Transform,
}

impl DynamicBinding {
    /// Pull this binding's cell out of `row` and apply the transform.
    pub fn extract(&self, row: &Row) -> Result<String, Csv2PdfError> {
        let cell = row.cell(self.column)?;
        Ok(self.transform.apply(cell))
    }
}

/// Text transform applied to a cell before it is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Cell text as-is. (default)
    #[default]
    Verbatim,
    /// Unicode upper-case.
    Uppercase,
}

impl Transform {
    pub fn apply(self, cell: &str) -> String {
        match self {
            Transform::Verbatim => cell.to_string(),
            Transform::Uppercase => cell.to_uppercase(),
        }
    }
}

impl FieldBindingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal static field.
    pub fn static_text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_fields.push(StaticBinding {
            field: field.into(),
            value: StaticValue::Text(value.into()),
        });
        self
    }

    /// Add a static field holding the run date.
    pub fn static_date(mut self, field: impl Into<String>, format: impl Into<String>) -> Self {
        self.static_fields.push(StaticBinding {
            field: field.into(),
            value: StaticValue::CurrentDate {
                format: format.into(),
            },
        });
        self
    }

    /// Add a per-row field read from `column`.
    pub fn dynamic(mut self, field: impl Into<String>, column: usize, transform: Transform) -> Self {
        self.dynamic_fields.push(DynamicBinding {
            field: field.into(),
            column,
            transform,
        });
        self
    }

    /// Require `field` to exist on the form as a text field without writing to it.
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Whether there is any once-per-run work (static writes or field checks).
    pub fn has_static(&self) -> bool {
        !self.static_fields.is_empty() || !self.required_fields.is_empty()
    }

    /// Every field name referenced: static, then required, then dynamic.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.static_fields
            .iter()
            .map(|b| b.field.as_str())
            .chain(self.required_fields.iter().map(String::as_str))
            .chain(self.dynamic_fields.iter().map(|b| b.field.as_str()))
    }

    /// Load a spec from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Csv2PdfError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Csv2PdfError::from_read(path, e))?;
        let spec: Self =
            serde_json::from_str(&text).map_err(|e| Csv2PdfError::InvalidBindings {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reject empty specs, blank or duplicated field names, and bad date formats.
    pub fn validate(&self) -> Result<(), Csv2PdfError> {
        if self.field_names().next().is_none() {
            return Err(Csv2PdfError::InvalidConfig(
                "Field bindings are empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for name in self.field_names() {
            if name.trim().is_empty() {
                return Err(Csv2PdfError::InvalidConfig(
                    "Field binding with an empty field name".into(),
                ));
            }
            if !seen.insert(name) {
                return Err(Csv2PdfError::InvalidConfig(format!(
                    "Field '{name}' is bound more than once"
                )));
            }
        }

        for b in &self.static_fields {
            if let StaticValue::CurrentDate { format } = &b.value {
                format_date(NaiveDate::default(), format).map_err(|e| {
                    Csv2PdfError::InvalidConfig(format!("{e} (field '{}')", b.field))
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        Row::new(1, cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn uppercase_transform() {
        let b = DynamicBinding {
            field: "ProductName".into(),
            column: 0,
            transform: Transform::Uppercase,
        };
        assert_eq!(b.extract(&row(&["pork belly", "5 lb"])).unwrap(), "PORK BELLY");
    }

    #[test]
    fn verbatim_keeps_whitespace_and_case() {
        let b = DynamicBinding {
            field: "Weight".into(),
            column: 1,
            transform: Transform::Verbatim,
        };
        assert_eq!(b.extract(&row(&["x", " 5 Lb "])).unwrap(), " 5 Lb ");
    }

    #[test]
    fn extract_short_row_is_missing_cell() {
        let b = DynamicBinding {
            field: "Weight".into(),
            column: 1,
            transform: Transform::Verbatim,
        };
        let err = b.extract(&row(&["only one"])).unwrap_err();
        assert!(matches!(err, Csv2PdfError::MissingCell { column: 1, len: 1, .. }));
    }

    #[test]
    fn current_date_resolves_two_digit_fields() {
        let v = StaticValue::CurrentDate {
            format: "%m/%d/%y".into(),
        };
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(v.resolve(day).unwrap(), "03/07/24");
    }

    #[test]
    fn validate_rejects_duplicates() {
        let spec = FieldBindingSpec::new()
            .static_text("ProductName", "x")
            .dynamic("ProductName", 0, Transform::Verbatim);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_date_format() {
        let spec = FieldBindingSpec::new().static_date("Date", "%Q");
        assert!(spec.validate().is_err());
    }

    #[test]
    fn validate_rejects_time_only_date_formats() {
        for format in ["%H:%M", "%z", "%m/%d/%y %S"] {
            let spec = FieldBindingSpec::new().static_date("Date", format);
            let err = spec.validate().unwrap_err();
            assert!(matches!(err, Csv2PdfError::InvalidConfig(_)), "{format}");
        }
    }

    #[test]
    fn resolve_time_format_is_an_error_not_a_panic() {
        let v = StaticValue::CurrentDate {
            format: "%H:%M".into(),
        };
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let err = v.resolve(day).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn from_json_file_rejects_time_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        std::fs::write(
            &path,
            r#"{ "static_fields": [{ "field": "Date", "value": { "current_date": { "format": "%H:%M" } } }] }"#,
        )
        .unwrap();
        let err = FieldBindingSpec::from_json_file(&path).unwrap_err();
        assert!(matches!(err, Csv2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn required_fields_count_as_static_work() {
        let spec = FieldBindingSpec::new().require("SignerPhoneNumber");
        assert!(spec.has_static());
        assert_eq!(spec.field_names().collect::<Vec<_>>(), ["SignerPhoneNumber"]);
        spec.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(FieldBindingSpec::new().validate().is_err());
    }

    #[test]
    fn json_shape() {
        let json = r#"{
            "static_fields": [
                { "field": "Origin", "value": { "text": "NY" } },
                { "field": "Date", "value": { "current_date": { "format": "%m/%d/%y" } } }
            ],
            "dynamic_fields": [
                { "field": "ProductName", "column": 0, "transform": "uppercase" },
                { "field": "Weight", "column": 1 }
            ]
        }"#;
        let spec: FieldBindingSpec = serde_json::from_str(json).unwrap();
        assert_eq!(
            spec,
            FieldBindingSpec::new()
                .static_text("Origin", "NY")
                .static_date("Date", "%m/%d/%y")
                .dynamic("ProductName", 0, Transform::Uppercase)
                .dynamic("Weight", 1, Transform::Verbatim)
        );
        spec.validate().unwrap();
    }

    #[test]
    fn from_json_file_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FieldBindingSpec::from_json_file(&path).unwrap_err();
        assert!(matches!(err, Csv2PdfError::InvalidBindings { .. }));
    }
}
