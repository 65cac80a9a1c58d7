//! CLI binary for csv2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `FillConfig` and prints results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use csv2pdf::{
    fill, inspect_template, FieldBindingSpec, FillConfig, FillProgressCallback, ProgressCallback,
    RunPhase, Variant,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while inputs load, then a bar with
/// one log line per written file.
struct CliProgressCallback {
    bar: ProgressBar,
    row_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner only; `on_run_start` turns it into a bar once the row count
    /// is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading CSV…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            row_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} rows  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Filling");
    }
}

impl FillProgressCallback for CliProgressCallback {
    fn on_phase_change(&self, phase: RunPhase) {
        match phase {
            RunPhase::LoadingTemplate => self.bar.set_message("Reading PDF…"),
            RunPhase::BindingStatic => self.bar.set_message("Setting static fields…"),
            RunPhase::Failed => self.bar.abandon(),
            _ => {}
        }
    }

    fn on_run_start(&self, total_rows: usize) {
        self.activate_bar(total_rows);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Filling {total_rows} rows…"))
        ));
    }

    fn on_row_start(&self, row: usize, _total: usize) {
        if let Ok(mut started) = self.row_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("row {row}"));
    }

    fn on_file_written(&self, row: usize, total: usize, path: &Path, bytes: usize) {
        let elapsed_ms = self
            .row_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.bar.println(format!(
            "  {} Row {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            row,
            total,
            name,
            dim(&format!("{:>7} bytes", bytes)),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, files_written: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} PDFs written",
            green("✔"),
            bold(&files_written.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cut labels from ./cuts.csv into ./outputs/
  csv2pdf

  # Product formulation statements
  csv2pdf --variant products

  # Explicit inputs and a fixed date for the Date field
  csv2pdf --variant products --csv data/products.csv \
      --template "forms/Glynwood New Product Formulation Statement NYF - Template.pdf" \
      --date 03/14/2025

  # Custom field bindings
  csv2pdf --bindings bindings.json --slug-columns 0,2

  # List the form fields of a template
  csv2pdf --list-fields --template "Glynwood Center Label - Template.pdf"

BINDINGS FILE:
  {
    "static_fields":  [{ "field": "Manufacturer", "value": { "text": "Glynwood" } },
                       { "field": "Date", "value": { "current_date": { "format": "%m/%d/%y" } } }],
    "dynamic_fields": [{ "field": "ProductName", "column": 0, "transform": "uppercase" }],
    "required_fields": ["SignerPhoneNumber"]
  }

OUTPUT NAMING:
  The first "Template" in the template's file name is replaced by a slug of
  each row's identifying cells. The output directory must already exist;
  files with the same name are overwritten.

ENVIRONMENT VARIABLES:
  Every flag has a CSV2PDF_* fallback (e.g. CSV2PDF_VARIANT, CSV2PDF_CSV).
  RUST_LOG overrides the log filter.
"#;

/// Fill a PDF form template once per CSV row.
#[derive(Parser, Debug)]
#[command(
    name = "csv2pdf",
    version,
    about = "Fill a PDF form template once per CSV row",
    long_about = "Read a CSV file and write one filled copy of a fillable PDF form per data row. \
The header row is skipped. Each output is named after the template, with 'Template' replaced \
by a slug of the row's identifying cells.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Built-in form: cuts (labels) or products (formulation statements).
    #[arg(long, env = "CSV2PDF_VARIANT", value_enum, default_value = "cuts")]
    variant: VariantArg,

    /// CSV input. Default: cuts.csv or products.csv.
    #[arg(long, env = "CSV2PDF_CSV")]
    csv: Option<PathBuf>,

    /// Fillable PDF template. Default: the variant's template name.
    #[arg(long, env = "CSV2PDF_TEMPLATE")]
    template: Option<PathBuf>,

    /// Existing directory for the filled PDFs.
    #[arg(long, env = "CSV2PDF_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file with custom field bindings (replaces the variant's).
    #[arg(long, env = "CSV2PDF_BINDINGS")]
    bindings: Option<PathBuf>,

    /// Comma-separated 0-based columns that name each output.
    #[arg(long, env = "CSV2PDF_SLUG_COLUMNS", value_delimiter = ',')]
    slug_columns: Option<Vec<usize>>,

    /// Date for date fields: MM/DD/YYYY or YYYY-MM-DD. Default: today.
    #[arg(long, env = "CSV2PDF_DATE", value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Print the template's form fields and exit.
    #[arg(long)]
    list_fields: bool,

    /// Print JSON (RunSummary, or fields with --list-fields).
    #[arg(long, env = "CSV2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CSV2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CSV2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CSV2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum VariantArg {
    Cuts,
    Products,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Cuts => Variant::Cuts,
            VariantArg::Products => Variant::Products,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces the per-file INFO lines.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_fields;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let variant = Variant::from(cli.variant);

    // ── List-fields mode ─────────────────────────────────────────────────
    if cli.list_fields {
        let template = cli
            .template
            .clone()
            .unwrap_or_else(|| PathBuf::from(variant.template_name()));
        let fields = inspect_template(&template)
            .await
            .with_context(|| format!("Failed to inspect {}", template.display()))?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&fields).context("Failed to serialize fields")?
            );
        } else {
            println!("Template:  {}", template.display());
            println!("Fields:    {}", fields.len());
            for f in &fields {
                println!(
                    "  {:<40} {:<4} {}",
                    f.name,
                    f.field_type.as_deref().unwrap_or("-"),
                    f.value.as_deref().map(dim).unwrap_or_default()
                );
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn FillProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, variant, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = fill(&config).await.context("PDF generation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        println!("Processed {} PDFs!", summary.files_written);
        if summary.collisions > 0 {
            eprintln!(
                "{} {} rows overwrote an earlier row's file",
                cyan("⚠"),
                summary.collisions
            );
        }
        eprintln!(
            "   {} distinct files in {}  ·  {}ms total",
            dim(&summary.outputs.len().to_string()),
            bold(&config.output_dir.display().to_string()),
            summary.duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `FillConfig`.
fn build_config(
    cli: &Cli,
    variant: Variant,
    progress: Option<ProgressCallback>,
) -> Result<FillConfig> {
    let mut builder = FillConfig::for_variant(variant);

    if let Some(ref path) = cli.csv {
        builder = builder.csv_path(path);
    }
    if let Some(ref path) = cli.template {
        builder = builder.template_path(path);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref path) = cli.bindings {
        let bindings = FieldBindingSpec::from_json_file(path)
            .with_context(|| format!("Failed to load bindings from {:?}", path))?;
        builder = builder.bindings(bindings);
    }
    if let Some(ref columns) = cli.slug_columns {
        builder = builder.slug_columns(columns.clone());
    }
    if let Some(date) = cli.date {
        builder = builder.date(date);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--date` as `MM/DD/YYYY` or ISO `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{s}': expected MM/DD/YYYY or YYYY-MM-DD"))
}
