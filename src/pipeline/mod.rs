//! Pipeline stages for CSV-to-PDF form filling.
//!
//! Each submodule implements exactly one step. The orchestrator in
//! [`crate::fill`] runs them strictly in sequence, one row at a time.
//!
//! ## Data Flow
//!
//! ```text
//! records ──┐
//!           ├──▶ bind ──▶ naming ──▶ write      (once per data row)
//! template ─┘
//! ```
//!
//! 1. [`records`] : read the CSV into positional rows, header included
//! 2. [`template`]: parse the PDF template and index its form fields
//! 3. [`bind`]    : write static fields once, dynamic fields per row
//! 4. [`naming`]  : slugify the identifying cells into an output file name
//! 5. [`write`]   : serialise the shared document and write it out
//!
//! [`appearance`] and [`encoding`] are helpers of [`template`]: the first
//! builds the `/AP /N` stream for a filled widget, the second converts text
//! between Rust strings and PDF string bytes.

pub mod appearance;
pub mod bind;
pub mod encoding;
pub mod naming;
pub mod records;
pub mod template;
pub mod write;
