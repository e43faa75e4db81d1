use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// What a registry file must satisfy beyond being a non-empty JSON list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryExpectation {
    /// Some entry has `"name": <name>`.
    ContainsTheme(String),
    /// The list has exactly this many entries.
    ExactCount(usize),
}

#[derive(Debug)]
pub enum RegistryError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Empty { path: PathBuf },
    MissingTheme { path: PathBuf, name: String },
    CountMismatch { path: PathBuf, expected: usize, actual: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Read { path, source } => {
                write!(f, "failed to read registry {}: {}", path.display(), source)
            }
            RegistryError::Parse { path, source } => {
                write!(f, "invalid JSON in {}: {}", path.display(), source)
            }
            RegistryError::Empty { path } => {
                write!(f, "expected {} to hold a list with at least one theme", path.display())
            }
            RegistryError::MissingTheme { path, name } => {
                write!(f, "expected {} to include {}", path.display(), name)
            }
            RegistryError::CountMismatch { path, expected, actual } => {
                write!(
                    f,
                    "expected {} to hold exactly {} themes, found {}",
                    path.display(),
                    expected,
                    actual
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Read { source, .. } => Some(source),
            RegistryError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySummary {
    pub path: PathBuf,
    pub themes: usize,
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.as_object()?.get("name")?.as_str()
}

pub fn check_registry(
    path: &Path,
    expectation: &RegistryExpectation,
) -> Result<RegistrySummary, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = match data.as_array() {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Err(RegistryError::Empty { path: path.to_path_buf() }),
    };

    match expectation {
        RegistryExpectation::ContainsTheme(name) => {
            if !entries.iter().any(|e| entry_name(e) == Some(name.as_str())) {
                return Err(RegistryError::MissingTheme {
                    path: path.to_path_buf(),
                    name: name.clone(),
                });
            }
        }
        RegistryExpectation::ExactCount(expected) => {
            if entries.len() != *expected {
                return Err(RegistryError::CountMismatch {
                    path: path.to_path_buf(),
                    expected: *expected,
                    actual: entries.len(),
                });
            }
        }
    }

    tracing::debug!(path = %path.display(), themes = entries.len(), "registry ok");
    Ok(RegistrySummary {
        path: path.to_path_buf(),
        themes: entries.len(),
    })
}
