//! Field binder: write static and per-row values into the form.

use crate::binding::FieldBindingSpec;
use crate::error::Csv2PdfError;
use crate::pipeline::records::Row;
use crate::pipeline::template::FormFields;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Write every static field once and check that required fields exist as
/// text fields.
///
/// Returns the number of fields written.
pub fn bind_static<F: FormFields + ?Sized>(
    form: &mut F,
    spec: &FieldBindingSpec,
    today: NaiveDate,
) -> Result<usize, Csv2PdfError> {
    info!("Setting static fields...");

    for name in &spec.required_fields {
        form.ensure_text_field(name)?;
    }

    for binding in &spec.static_fields {
        let value = binding.value.resolve(today)?;
        form.set_text(&binding.field, &value)?;
    }

    Ok(spec.static_fields.len())
}

/// Write every dynamic field from `row`.
///
/// All cells are extracted before the first write, so a short row leaves
/// the form untouched.
pub fn bind_dynamic<F: FormFields + ?Sized>(
    form: &mut F,
    spec: &FieldBindingSpec,
    row: &Row,
) -> Result<usize, Csv2PdfError> {
    let values = spec
        .dynamic_fields
        .iter()
        .map(|b| b.extract(row).map(|v| (b.field.as_str(), v)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Setting dynamic fields for row {}: {}",
        row.index(),
        row.cells().join(", ")
    );

    for (field, value) in &values {
        form.set_text(field, value)?;
    }
    debug!("Row {}: {} fields written", row.index(), values.len());

    Ok(values.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Transform;
    use crate::error::ErrorKind;
    use crate::presets;
    use std::collections::BTreeMap;

    /// In-memory form: field name → value. Names in `checkboxes` are
    /// non-text fields.
    #[derive(Default)]
    struct MapForm {
        fields: BTreeMap<String, Option<String>>,
        checkboxes: Vec<String>,
        writes: usize,
    }

    impl MapForm {
        fn with(names: &[&str]) -> Self {
            Self {
                fields: names.iter().map(|n| (n.to_string(), None)).collect(),
                ..Self::default()
            }
        }

        fn checkbox(mut self, name: &str) -> Self {
            self.fields.insert(name.into(), None);
            self.checkboxes.push(name.into());
            self
        }

        fn get(&self, name: &str) -> Option<&str> {
            self.fields.get(name).and_then(|v| v.as_deref())
        }
    }

    impl FormFields for MapForm {
        fn field_names(&self) -> Vec<String> {
            self.fields.keys().cloned().collect()
        }

        fn ensure_text_field(&self, name: &str) -> Result<(), Csv2PdfError> {
            if !self.fields.contains_key(name) {
                return Err(Csv2PdfError::FieldNotFound {
                    field: name.into(),
                    available: self.field_names(),
                });
            }
            if self.checkboxes.iter().any(|c| c == name) {
                return Err(Csv2PdfError::NotATextField {
                    field: name.into(),
                    found: "Btn".into(),
                });
            }
            Ok(())
        }

        fn set_text(&mut self, name: &str, value: &str) -> Result<(), Csv2PdfError> {
            self.ensure_text_field(name)?;
            self.fields.insert(name.into(), Some(value.into()));
            self.writes += 1;
            Ok(())
        }

        fn text(&self, name: &str) -> Result<Option<String>, Csv2PdfError> {
            self.ensure_text_field(name)?;
            Ok(self.fields[name].clone())
        }
    }

    fn row(index: usize, cells: &[&str]) -> Row {
        Row::new(index, cells.iter().map(|c| c.to_string()).collect())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    #[test]
    fn cut_label_row() {
        let mut form = MapForm::with(&["ProductName", "Weight"]);
        let spec = presets::cut_label_bindings();
        bind_dynamic(&mut form, &spec, &row(1, &["pork belly", "5 lb"])).unwrap();
        assert_eq!(form.get("ProductName"), Some("PORK BELLY"));
        assert_eq!(form.get("Weight"), Some("5 lb"));
    }

    #[test]
    fn product_formulation_static_block() {
        let spec = presets::product_formulation_bindings();
        let names: Vec<&str> = spec.field_names().collect();
        let mut form = MapForm::with(&names);

        let written = bind_static(&mut form, &spec, day()).unwrap();
        assert_eq!(written, 12);
        assert_eq!(form.get("Manufacturer"), Some("The Glynwood Center"));
        assert_eq!(form.get("RawIngredient1Location"), Some("Cold Spring, NY"));
        assert_eq!(form.get("Ingredient1PercentNYS"), Some("100%"));
        assert_eq!(form.get("Date"), Some("11/05/24"));
        assert_eq!(form.get("IntermediarySteps"), Some(presets::INTERMEDIARY_STEPS));
        // Checked, never written.
        assert_eq!(form.get("SignerPhoneNumber"), None);
        // Dynamic fields untouched until a row is bound.
        assert_eq!(form.get("ProductName"), None);
    }

    #[test]
    fn product_formulation_row() {
        let spec = presets::product_formulation_bindings();
        let names: Vec<&str> = spec.field_names().collect();
        let mut form = MapForm::with(&names);

        bind_dynamic(&mut form, &spec, &row(1, &["pork", "sausage"])).unwrap();
        assert_eq!(form.get("ProductName"), Some("sausage"));
        assert_eq!(form.get("Ingredient1"), Some("pork"));
        assert_eq!(form.get("RawIngredient1"), Some("pork"));
    }

    #[test]
    fn later_row_overwrites_earlier_values() {
        let mut form = MapForm::with(&["ProductName", "Weight"]);
        let spec = presets::cut_label_bindings();
        bind_dynamic(&mut form, &spec, &row(1, &["pork belly", "5 lb"])).unwrap();
        bind_dynamic(&mut form, &spec, &row(2, &["ham hock", "2 lb"])).unwrap();
        assert_eq!(form.get("ProductName"), Some("HAM HOCK"));
        assert_eq!(form.get("Weight"), Some("2 lb"));
    }

    #[test]
    fn missing_static_field_fails() {
        let mut form = MapForm::with(&["Manufacturer"]);
        let spec = FieldBindingSpec::new()
            .static_text("Manufacturer", "x")
            .static_text("Origin", "NY");
        let err = bind_static(&mut form, &spec, day()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn missing_required_field_fails_before_any_write() {
        let mut form = MapForm::with(&["Manufacturer"]);
        let spec = FieldBindingSpec::new()
            .static_text("Manufacturer", "x")
            .require("SignerPhoneNumber");
        let err = bind_static(&mut form, &spec, day()).unwrap_err();
        assert!(matches!(err, Csv2PdfError::FieldNotFound { ref field, .. } if field == "SignerPhoneNumber"));
        assert_eq!(form.writes, 0);
    }

    #[test]
    fn required_checkbox_fails_before_any_write() {
        let mut form = MapForm::with(&["Manufacturer"]).checkbox("SignerPhoneNumber");
        let spec = FieldBindingSpec::new()
            .static_text("Manufacturer", "x")
            .require("SignerPhoneNumber");
        let err = bind_static(&mut form, &spec, day()).unwrap_err();
        assert!(matches!(err, Csv2PdfError::NotATextField { ref field, .. } if field == "SignerPhoneNumber"));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(form.writes, 0);
    }

    #[test]
    fn time_only_date_format_is_an_error() {
        let mut form = MapForm::with(&["Date"]);
        let spec = FieldBindingSpec::new().static_date("Date", "%H:%M");
        let err = bind_static(&mut form, &spec, day()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(form.get("Date"), None);
    }

    #[test]
    fn short_row_writes_nothing() {
        let mut form = MapForm::with(&["ProductName", "Weight"]);
        let spec = FieldBindingSpec::new()
            .dynamic("ProductName", 0, Transform::Verbatim)
            .dynamic("Weight", 1, Transform::Verbatim);
        let err = bind_dynamic(&mut form, &spec, &row(7, &["lonely"])).unwrap_err();
        assert!(matches!(err, Csv2PdfError::MissingCell { row: 7, column: 1, .. }));
        assert_eq!(form.writes, 0);
    }
}
