use crate::error::DocumentError;
use std::path::Path;

/// A source file held as an ordered sequence of lines.
///
/// Lines are stored without their `\n` terminator. Whether the text ended
/// with a newline is remembered so [`SourceDocument::to_source`] reproduces
/// the original bytes for an unmodified document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl SourceDocument {
    pub fn new(lines: Vec<String>, trailing_newline: bool) -> Self {
        Self { lines, trailing_newline }
    }

    /// Reads the whole file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| DocumentError::read(path, e))?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded source document");
        Ok(Self::from_source(&source))
    }

    pub fn from_source(source: &str) -> Self {
        if source.is_empty() {
            return Self::default();
        }

        let (body, trailing_newline) = match source.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (source, false),
        };

        Self {
            lines: body.split('\n').map(str::to_string).collect(),
            trailing_newline,
        }
    }

    pub fn to_source(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 1-indexed line lookup.
    pub fn line(&self, number: usize) -> Option<&str> {
        number.checked_sub(1).and_then(|idx| self.lines.get(idx)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_trailing_newline() {
        let source = "local M = {}\nreturn M\n";
        let doc = SourceDocument::from_source(source);
        assert_eq!(doc.len(), 2);
        assert!(doc.has_trailing_newline());
        assert_eq!(doc.to_source(), source);
    }

    #[test]
    fn test_without_trailing_newline() {
        let doc = SourceDocument::from_source("a\nb");
        assert_eq!(doc.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(doc.to_source(), "a\nb");
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let doc = SourceDocument::from_source("a\n\n\nb\n");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.line(2), Some(""));
        assert_eq!(doc.line(4), Some("b"));
        assert_eq!(doc.line(0), None);
        assert_eq!(doc.line(5), None);
    }

    #[test]
    fn test_empty_source() {
        let doc = SourceDocument::from_source("");
        assert!(doc.is_empty());
        assert_eq!(doc.to_source(), "");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SourceDocument::load("/definitely/not/here.lua").unwrap_err();
        assert_eq!(err.io_kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("failed to read"));
    }
}
