use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum DocumentError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Template { path: PathBuf, source: io::Error },
}

impl DocumentError {
    pub fn read(path: impl AsRef<Path>, source: io::Error) -> Self {
        DocumentError::Read { path: path.as_ref().to_path_buf(), source }
    }

    pub fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        DocumentError::Write { path: path.as_ref().to_path_buf(), source }
    }

    pub fn path(&self) -> &Path {
        match self {
            DocumentError::Read { path, .. } => path,
            DocumentError::Write { path, .. } => path,
            DocumentError::Template { path, .. } => path,
        }
    }

    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            DocumentError::Read { source, .. } => source.kind(),
            DocumentError::Write { source, .. } => source.kind(),
            DocumentError::Template { source, .. } => source.kind(),
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            DocumentError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            DocumentError::Template { path, source } => {
                write!(f, "failed to read preamble template {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Read { source, .. } => Some(source),
            DocumentError::Write { source, .. } => Some(source),
            DocumentError::Template { source, .. } => Some(source),
        }
    }
}
