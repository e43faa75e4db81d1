use crate::document::SourceDocument;
use crate::error::DocumentError;
use crate::rewriter::{Collision, RewriteOptions, Rewriter, Substitution};
use crate::writer::{WriteMode, WriteSummary, write_document};
use std::path::Path;

/// Result of one load → rewrite → write run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorReport {
    pub input_lines: usize,
    pub output_lines: usize,
    pub substitutions: Vec<Substitution>,
    pub collisions: Vec<Collision>,
    /// What reached the disk, `None` for a dry run.
    pub write: Option<WriteSummary>,
}

impl RefactorReport {
    pub fn written(&self) -> bool {
        self.write.is_some()
    }
}

/// Rewrites the file at `path` in place. With `dry_run` the file is left
/// untouched and the report describes what would have been written.
pub fn refactor_file(
    path: impl AsRef<Path>,
    options: &RewriteOptions,
    mode: WriteMode,
    dry_run: bool,
) -> Result<RefactorReport, DocumentError> {
    let path = path.as_ref();
    let input = SourceDocument::load(path)?;
    let outcome = Rewriter::new(options.clone()).rewrite(&input);

    if outcome.is_unchanged() {
        tracing::info!(path = %path.display(), "no cache declarations to rewrite");
    }

    let write = if dry_run {
        None
    } else {
        Some(write_document(path, &outcome.document, mode)?)
    };

    Ok(RefactorReport {
        input_lines: input.len(),
        output_lines: outcome.document.len(),
        substitutions: outcome.substitutions,
        collisions: outcome.collisions,
        write,
    })
}
