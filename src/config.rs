//! Configuration types for a fill run.
//!
//! Everything a run needs lives in [`FillConfig`], built via
//! [`FillConfigBuilder`]. The two built-in form variants are presets on the
//! builder; every field can still be overridden individually.

use crate::binding::FieldBindingSpec;
use crate::error::Csv2PdfError;
use crate::presets;
use crate::progress::ProgressCallback;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for one CSV-to-PDF fill run.
///
/// # Example
/// ```rust
/// use csv2pdf::{FillConfig, Variant};
///
/// let config = FillConfig::for_variant(Variant::Products)
///     .csv_path("data/products.csv")
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.slug_columns, vec![0, 1]);
/// ```
#[derive(Clone)]
pub struct FillConfig {
    /// CSV with a header row followed by one data row per output file.
    pub csv_path: PathBuf,

    /// Fillable PDF template. Its file name, with `Template` replaced by each
    /// row's slug, names the outputs.
    pub template_path: PathBuf,

    /// Existing directory the filled PDFs are written to. Default: `outputs`.
    pub output_dir: PathBuf,

    /// Which fields receive which values.
    pub bindings: FieldBindingSpec,

    /// Cells joined (space-separated) and slugified to name each output.
    pub slug_columns: Vec<usize>,

    /// Date used for date-valued static fields. `None` means today, local time.
    pub date: Option<NaiveDate>,

    /// Optional per-row progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

impl fmt::Debug for FillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillConfig")
            .field("csv_path", &self.csv_path)
            .field("template_path", &self.template_path)
            .field("output_dir", &self.output_dir)
            .field("bindings", &self.bindings)
            .field("slug_columns", &self.slug_columns)
            .field("date", &self.date)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn FillProgressCallback>"),
            )
            .finish()
    }
}

impl FillConfig {
    /// Builder starting from the default variant ([`Variant::Cuts`]).
    pub fn builder() -> FillConfigBuilder {
        FillConfigBuilder {
            config: Self::default(),
        }
    }

    /// Builder starting from a variant's preset.
    pub fn for_variant(variant: Variant) -> FillConfigBuilder {
        FillConfigBuilder {
            config: variant.config(),
        }
    }

    /// The configured date, or today's local date.
    pub fn run_date(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Builder for [`FillConfig`].
#[derive(Debug)]
pub struct FillConfigBuilder {
    config: FillConfig,
}

impl FillConfigBuilder {
    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.csv_path = path.into();
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn bindings(mut self, bindings: FieldBindingSpec) -> Self {
        self.config.bindings = bindings;
        self
    }

    pub fn slug_columns(mut self, columns: Vec<usize>) -> Self {
        self.config.slug_columns = columns;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.config.date = Some(date);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FillConfig, Csv2PdfError> {
        let c = &self.config;
        if c.slug_columns.is_empty() {
            return Err(Csv2PdfError::InvalidConfig(
                "At least one slug column is required".into(),
            ));
        }
        if c.template_path.file_name().is_none() {
            return Err(Csv2PdfError::InvalidConfig(format!(
                "Template path {:?} has no file name",
                c.template_path
            )));
        }
        c.bindings.validate()?;
        Ok(self.config)
    }
}

// ── Variants ─────────────────────────────────────────────────────────────

/// The built-in forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Cut labels: name (upper-cased) and weight per row. (default)
    #[default]
    Cuts,
    /// Product formulation statements: fixed provenance block plus
    /// ingredient and product name per row.
    Products,
}

impl Variant {
    pub fn csv_name(self) -> &'static str {
        match self {
            Variant::Cuts => presets::CUTS_CSV,
            Variant::Products => presets::PRODUCTS_CSV,
        }
    }

    pub fn template_name(self) -> &'static str {
        match self {
            Variant::Cuts => presets::CUTS_TEMPLATE,
            Variant::Products => presets::PRODUCTS_TEMPLATE,
        }
    }

    /// Cells that identify a row.
    pub fn slug_columns(self) -> Vec<usize> {
        match self {
            Variant::Cuts => vec![0],
            Variant::Products => vec![0, 1],
        }
    }

    pub fn bindings(self) -> FieldBindingSpec {
        match self {
            Variant::Cuts => presets::cut_label_bindings(),
            Variant::Products => presets::product_formulation_bindings(),
        }
    }

    /// Full preset: files relative to the working directory.
    pub fn config(self) -> FillConfig {
        FillConfig {
            csv_path: PathBuf::from(self.csv_name()),
            template_path: PathBuf::from(self.template_name()),
            output_dir: PathBuf::from(presets::DEFAULT_OUTPUT_DIR),
            bindings: self.bindings(),
            slug_columns: self.slug_columns(),
            date: None,
            progress_callback: None,
        }
    }
}
