//! Built-in bindings for the two Glynwood forms.
//!
//! Keeping the literal values here means a change to the signer, the farm
//! location or the provenance narrative touches exactly one place.

use crate::binding::{FieldBindingSpec, Transform};

/// Default CSV for the cut-label run.
pub const CUTS_CSV: &str = "cuts.csv";

/// Default template for the cut-label run.
pub const CUTS_TEMPLATE: &str = "Glynwood Center Label - Template.pdf";

/// Default CSV for the product-formulation run.
pub const PRODUCTS_CSV: &str = "products.csv";

/// Default template for the product-formulation run.
pub const PRODUCTS_TEMPLATE: &str = "Glynwood New Product Formulation Statement NYF - Template.pdf";

/// Directory outputs are written to unless overridden.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Substring of the template file name replaced by each row's slug.
pub const TEMPLATE_MARKER: &str = "Template";

/// Two-digit month/day/year.
pub const DATE_FORMAT: &str = "%m/%d/%y";

pub const MANUFACTURER: &str = "The Glynwood Center";
pub const FARM_LOCATION: &str = "Cold Spring, NY";
pub const SIGNER_PRINTED_NAME: &str = "Nicole Scott";

/// Provenance narrative written into `IntermediarySteps`.
pub const INTERMEDIARY_STEPS: &str = "Animals raised at The Glynwood Center in Cold Spring, NY \
were transported by Glynwood staff to the slaughterhouse, which is also in NY state. Animals \
were processed and butchered at the slaughterhouse. Meat was picked up by Glynwood staff and \
returned to the farm in Cold Spring, NY where it was sold direct to customer.";

/// Cut labels: `[0]` cut name (upper-cased), `[1]` weight.
pub fn cut_label_bindings() -> FieldBindingSpec {
    FieldBindingSpec::new()
        .dynamic("ProductName", 0, Transform::Uppercase)
        .dynamic("Weight", 1, Transform::Verbatim)
}

/// Product formulation statements: a fixed provenance block plus
/// `[0]` raw ingredient and `[1]` product name per row.
pub fn product_formulation_bindings() -> FieldBindingSpec {
    FieldBindingSpec::new()
        .static_text("Manufacturer", MANUFACTURER)
        .static_text("Ingredient1Origin", "NY")
        .static_text("Ingredient1NYSWeight", "100%")
        .static_text("Ingredient1TotalWeight", "100%")
        .static_text("Ingredient1PercentNYS", "100%")
        .static_text("RawIngredient1Source", MANUFACTURER)
        .static_text("RawIngredient1Location", FARM_LOCATION)
        .static_text("RawIngredient1MilesP2P", "130")
        .static_text("RawIngredient1MilesP2F", "130")
        .static_text("IntermediarySteps", INTERMEDIARY_STEPS)
        .static_text("SignerPrintedName", SIGNER_PRINTED_NAME)
        .static_date("Date", DATE_FORMAT)
        .require("SignerPhoneNumber")
        .dynamic("ProductName", 1, Transform::Verbatim)
        .dynamic("Ingredient1", 0, Transform::Verbatim)
        .dynamic("RawIngredient1", 0, Transform::Verbatim)
}
