//! PDF intake: Hangul file names are transliterated to ASCII copies before loading.

mod filename;
mod loader;

pub use filename::{ascii_file_name, contains_hangul, normalize_path};
pub use loader::PdfLoader;
#[cfg(test)]
pub(crate) use loader::fixture::write_pdf as write_fixture_pdf;

use std::fs::{self, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::Document;

pub const DEFAULT_COPY_DIR: &str = "data";

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to parse PDF {}: {source}", .path.display())]
    Parse { path: PathBuf, source: lopdf::Error },
}

#[derive(Debug)]
pub struct LoadedPdf {
    pub loader: PdfLoader,
    pub pages: Vec<Document>,
    pub resolved_path: PathBuf,
}

/// Normalize `path`, copy it under an ASCII name into `copy_dir` if its file
/// name contains Hangul, and load the resulting file.
///
/// The original file is never modified. `copy_dir` must already exist.
pub fn normalize_and_load(
    path: impl AsRef<Path>,
    copy_dir: impl AsRef<Path>,
) -> Result<LoadedPdf, PdfError> {
    let normalized = normalize_path(path.as_ref());
    if !normalized.is_file() {
        return Err(PdfError::NotFound(normalized));
    }

    let file_name = normalized
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let resolved_path = if contains_hangul(&file_name) {
        let target = copy_dir.as_ref().join(ascii_file_name(&file_name));
        copy_preserving_times(&normalized, &target).map_err(|source| PdfError::Copy {
            from: normalized.clone(),
            to: target.clone(),
            source,
        })?;
        info!(from = %normalized.display(), to = %target.display(), "hangul file name, copied to ascii name");
        target
    } else {
        info!(path = %normalized.display(), "no hangul in file name, using original");
        normalized
    };

    let loader = PdfLoader::new(&resolved_path);
    let pages = loader.load()?;
    info!(path = %resolved_path.display(), pages = pages.len(), "pdf pages loaded");

    Ok(LoadedPdf {
        loader,
        pages,
        resolved_path,
    })
}

/// Copy file contents and permissions, then carry over access/modification times.
///
/// The copy may be read-only, so times are set through a read handle.
fn copy_preserving_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let meta = fs::metadata(from)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    fs::File::open(to)?.set_times(times)
}
