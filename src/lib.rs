//! # csv2pdf
//!
//! Fill a fillable PDF form once per row of a CSV file.
//!
//! Each data row of the CSV (the header row is skipped) produces one copy of
//! the template with its form fields set from the row's cells. Output files
//! are named after the template, with the word `Template` in its file name
//! replaced by a slug of the row's identifying cells:
//!
//! ```text
//! cuts.csv                                 outputs/
//!   Name,Weight                              Glynwood Center Label - pork-belly.pdf
//!   pork belly,5 lb      ──▶  template  ──▶  Glynwood Center Label - ham-hock.pdf
//!   ham hock,2 lb
//! ```
//!
//! ## Pipeline Overview
//!
//! ```text
//!  ├─ 1. Records   read the whole CSV into positional rows
//!  ├─ 2. Template  parse the PDF and index its AcroForm fields
//!  ├─ 3. Static    write run-constant fields once
//!  └─ 4. Per row   dynamic fields → slug → output path → write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csv2pdf::{fill, FillConfig, Variant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FillConfig::for_variant(Variant::Cuts).build()?;
//!     let summary = fill(&config).await?;
//!     println!("Processed {} PDFs!", summary.files_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `csv2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! csv2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod binding;
pub mod config;
pub mod error;
pub mod fill;
pub mod output;
pub mod pipeline;
pub mod presets;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use binding::{DynamicBinding, FieldBindingSpec, StaticBinding, StaticValue, Transform};
pub use config::{FillConfig, FillConfigBuilder, Variant};
pub use error::{Csv2PdfError, ErrorKind};
pub use fill::{fill, fill_sync, inspect_template};
pub use output::{RunPhase, RunSummary};
pub use pipeline::naming::slug;
pub use pipeline::template::{FormDocument, FormFieldInfo, FormFields};
pub use progress::{FillProgressCallback, NoopProgressCallback, ProgressCallback};
