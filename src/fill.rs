//! Run orchestrator: one filled PDF per CSV data row.
//!
//! The sequence is strictly linear:
//!
//! ```text
//! LoadingRecords ─▶ LoadingTemplate ─▶ BindingStatic ─▶ IteratingRows ─▶ Done
//!                                       (if any)          (per row)
//! ```
//!
//! The template is parsed once and the same document is mutated and
//! re-serialised for every row. The first error from any stage aborts the
//! run; files written by earlier rows stay on disk.

use crate::config::FillConfig;
use crate::error::Csv2PdfError;
use crate::output::{RunPhase, RunSummary};
use crate::pipeline::template::FormFieldInfo;
use crate::pipeline::write::DocumentWriter;
use crate::pipeline::{bind, naming, records, template};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Fill the template once per data row of the CSV.
///
/// # Returns
/// A [`RunSummary`]; `files_written` is the number of PDFs written.
///
/// # Errors
/// The first failure of any stage: unreadable inputs, malformed CSV,
/// malformed or form-less PDF, a binding naming a missing field, a row too
/// short for the bindings, or an unwritable output path.
pub async fn fill(config: &FillConfig) -> Result<RunSummary, Csv2PdfError> {
    let mut run = FillRun::new(config);
    match run.execute().await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            error!("Run failed while {}: {}", run.phase, e);
            run.transition(RunPhase::Failed);
            Err(e)
        }
    }
}

/// Synchronous wrapper around [`fill`].
///
/// Creates a temporary tokio runtime internally.
pub fn fill_sync(config: &FillConfig) -> Result<RunSummary, Csv2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Csv2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(fill(config))
}

/// List the form fields of a template without filling anything.
pub async fn inspect_template(path: impl AsRef<Path>) -> Result<Vec<FormFieldInfo>, Csv2PdfError> {
    let document = template::load_template(path.as_ref()).await?;
    Ok(document.fields())
}

struct FillRun<'a> {
    config: &'a FillConfig,
    phase: RunPhase,
}

impl<'a> FillRun<'a> {
    fn new(config: &'a FillConfig) -> Self {
        Self {
            config,
            phase: RunPhase::NotStarted,
        }
    }

    fn transition(&mut self, phase: RunPhase) {
        debug!("Run phase: {} → {}", self.phase, phase);
        self.phase = phase;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_change(phase);
        }
    }

    async fn execute(&mut self) -> Result<RunSummary, Csv2PdfError> {
        let start = Instant::now();
        let config = self.config;
        info!("Starting PDF generation...");

        // ── Step 1: Records ──────────────────────────────────────────────
        self.transition(RunPhase::LoadingRecords);
        let rows = records::read_records(&config.csv_path).await?;

        // ── Step 2: Template ─────────────────────────────────────────────
        self.transition(RunPhase::LoadingTemplate);
        let mut document = template::load_template(&config.template_path).await?;

        // ── Step 3: Static fields, once ──────────────────────────────────
        if config.bindings.has_static() {
            self.transition(RunPhase::BindingStatic);
            bind::bind_static(&mut document, &config.bindings, config.run_date())?;
        }

        // ── Step 4: Rows ─────────────────────────────────────────────────
        let data_rows = rows.get(1..).unwrap_or_default();
        let total = data_rows.len();
        info!("Setting dynamic fields for {} rows...", total);

        if total > 1 && !naming::has_marker(&config.template_path) {
            warn!(
                "Template name {:?} has no 'Template' marker; every row writes the same file",
                config.template_path
            );
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_run_start(total);
        }
        self.transition(RunPhase::IteratingRows);

        let mut writer = DocumentWriter::new();
        let mut seen = HashSet::new();
        let mut outputs = Vec::new();
        let mut collisions = 0;

        for (i, row) in data_rows.iter().enumerate() {
            let row_num = i + 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_row_start(row_num, total);
            }

            let slug = row_slug(config, row)?;
            bind::bind_dynamic(&mut document, &config.bindings, row)?;
            let path = naming::output_path(&config.output_dir, &config.template_path, &slug);

            if seen.insert(path.clone()) {
                outputs.push(path.clone());
            } else {
                collisions += 1;
                warn!("Row {} overwrites {}", row.index(), path.display());
            }

            let bytes = writer.write(&mut document, &path).await?;
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_written(row_num, total, &path, bytes);
            }
        }

        // ── Step 5: Report ───────────────────────────────────────────────
        self.transition(RunPhase::Done);
        let files_written = writer.files_written();
        info!("Processed {} PDFs!", files_written);

        if let Some(ref cb) = config.progress_callback {
            cb.on_run_complete(files_written);
        }

        Ok(RunSummary {
            rows: total,
            files_written,
            outputs,
            collisions,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn row_slug(config: &FillConfig, row: &records::Row) -> Result<String, Csv2PdfError> {
    let parts = config
        .slug_columns
        .iter()
        .map(|&c| row.cell(c))
        .collect::<Result<Vec<_>, _>>()?;
    let slug = naming::slug(&parts);
    if slug.is_empty() {
        warn!("Row {} produced an empty slug", row.index());
    }
    Ok(slug)
}
