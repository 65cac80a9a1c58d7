//! Document writer: serialise the form and write it to disk.
//!
//! Bytes go to a sibling `.tmp` file first and are then renamed over the
//! target, so a crash mid-write never leaves a truncated PDF under the final
//! name. An existing file at the target is replaced without warning. The
//! parent directory is never created.

use crate::error::Csv2PdfError;
use crate::pipeline::template::FormDocument;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes filled documents and counts successful writes.
#[derive(Debug, Default)]
pub struct DocumentWriter {
    files_written: usize,
}

impl DocumentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files written so far in this run.
    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Serialise `document` and write it to `path`. Returns the byte count.
    ///
    /// The counter only advances once the file is in place.
    pub async fn write(
        &mut self,
        document: &mut FormDocument,
        path: &Path,
    ) -> Result<usize, Csv2PdfError> {
        info!("Saving PDF file: {}", path.display());

        let bytes = document.to_bytes()?;
        write_atomic(path, &bytes).await?;

        self.files_written += 1;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(bytes.len())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Csv2PdfError> {
    let write_err = |source: std::io::Error| Csv2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let tmp = tmp_path(path);
    let result = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    Ok(())
}
