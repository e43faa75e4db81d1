use crate::document::SourceDocument;
use crate::error::DocumentError;
use std::io::Write;
use std::path::Path;

/// How the rewritten document replaces the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write a sibling temporary file, then rename it over the target.
    #[default]
    Atomic,
    /// Truncate and overwrite the target directly.
    InPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub lines: usize,
    pub bytes: usize,
}

pub fn write_document(
    path: impl AsRef<Path>,
    document: &SourceDocument,
    mode: WriteMode,
) -> Result<WriteSummary, DocumentError> {
    let path = path.as_ref();
    let contents = document.to_source();

    match mode {
        WriteMode::InPlace => {
            std::fs::write(path, &contents).map_err(|e| DocumentError::write(path, e))?;
        }
        WriteMode::Atomic => write_atomic(path, contents.as_bytes())?,
    }

    tracing::debug!(path = %path.display(), ?mode, lines = document.len(), "wrote document");

    Ok(WriteSummary {
        lines: document.len(),
        bytes: contents.len(),
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DocumentError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // The temp file is deleted on drop if anything below fails.
    let mut temp = tempfile::Builder::new()
        .prefix(".tbtool-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| DocumentError::write(path, e))?;

    temp.write_all(contents).map_err(|e| DocumentError::write(path, e))?;
    temp.as_file().sync_all().map_err(|e| DocumentError::write(path, e))?;

    // A new target keeps the temp file's mode; an existing one keeps its own.
    if let Ok(metadata) = std::fs::metadata(path) {
        std::fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| DocumentError::write(path, e))?;
    }

    temp.persist(path).map_err(|e| DocumentError::write(path, e.error))?;
    Ok(())
}
