//! Slug namer: turn identifying row cells into an output file name.

use crate::presets::TEMPLATE_MARKER;
use std::path::{Path, PathBuf};

/// Join `parts` with single spaces and slugify the result.
///
/// The slug holds only lowercase ASCII letters, digits and single hyphens,
/// with no hyphen at either end. Non-ASCII letters are transliterated
/// (`jamón` becomes `jamon`). Empty input gives an empty slug.
pub fn slug<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" ");
    ::slug::slugify(joined)
}

/// `output_dir` joined with the template's file name, its first
/// `Template` replaced by `slug`.
pub fn output_path(output_dir: &Path, template_path: &Path, slug: &str) -> PathBuf {
    let file_name = template_file_name(template_path);
    output_dir.join(file_name.replacen(TEMPLATE_MARKER, slug, 1))
}

/// Whether outputs derived from this template get distinct names per slug.
pub fn has_marker(template_path: &Path) -> bool {
    template_file_name(template_path).contains(TEMPLATE_MARKER)
}

fn template_file_name(template_path: &Path) -> String {
    template_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
