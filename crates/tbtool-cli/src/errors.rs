use colored::*;
use std::fmt;
use std::io::ErrorKind;
use tbtool_harness::RegistryError;
use tbtool_refactor::DocumentError;

/// Enhanced error with context and suggestions
pub struct EnhancedError {
    pub message: String,
    pub file: Option<String>,
    pub causes: Vec<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl EnhancedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            causes: Vec::new(),
            suggestion: None,
            help: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Display the error with colored output and context
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message.bold());

        if let Some(file) = &self.file {
            eprintln!("  {} {}", "-->".blue().bold(), file);
        }

        for cause in &self.causes {
            eprintln!("  {} {}", "|".blue().bold(), cause.dimmed());
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!();
            eprintln!("{} {}", "suggestion:".green().bold(), suggestion);
        }

        if let Some(help) = &self.help {
            eprintln!();
            eprintln!("{} {}", "help:".cyan().bold(), help);
        }
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnhancedError: {}", self.message)
    }
}

impl std::error::Error for EnhancedError {}

/// Convert anyhow::Error to EnhancedError with suggestions
pub fn enhance_error(err: anyhow::Error) -> EnhancedError {
    let mut enhanced = EnhancedError::new(err.to_string());

    for cause in err.chain().skip(1) {
        enhanced = enhanced.with_cause(cause.to_string());
    }

    if let Some(doc_err) = err.downcast_ref::<DocumentError>() {
        enhanced = enhanced.with_file(doc_err.path().display().to_string());
        match doc_err {
            DocumentError::Read { .. } if doc_err.io_kind() == ErrorKind::NotFound => {
                enhanced = enhanced
                    .with_suggestion(
                        "Run tbtool from the plugin root, or pass the file: tbtool refactor <PATH>",
                    )
                    .with_help(format!(
                        "The default target is {} (set refactor_target in .tbrc)",
                        tbtool_refactor::DEFAULT_TARGET
                    ));
            }
            DocumentError::Write { .. } => {
                enhanced = enhanced
                    .with_suggestion("Check that the file and its directory are writable")
                    .with_help(
                        "With atomic_write = true the original file is left intact on failure",
                    );
            }
            DocumentError::Template { .. } => {
                enhanced = enhanced.with_help("preamble_template must point at a readable Lua file");
            }
            _ => {}
        }
        return enhanced;
    }

    if let Some(reg_err) = err.downcast_ref::<RegistryError>() {
        match reg_err {
            RegistryError::Read { path, .. } => {
                enhanced = enhanced
                    .with_file(path.display().to_string())
                    .with_suggestion("Run tbtool smoke from the plugin root or pass --root");
            }
            RegistryError::MissingTheme { path, name } => {
                enhanced = enhanced
                    .with_file(path.display().to_string())
                    .with_suggestion(format!("Add an entry with \"name\": \"{}\" to the registry", name))
                    .with_help("Change required_theme in .tbrc to smoke-test a different theme");
            }
            RegistryError::CountMismatch { path, .. } => {
                enhanced = enhanced
                    .with_file(path.display().to_string())
                    .with_suggestion("Regenerate the curated index or update index_expected_count");
            }
            RegistryError::Parse { path, .. } | RegistryError::Empty { path } => {
                enhanced = enhanced.with_file(path.display().to_string());
            }
        }
        return enhanced;
    }

    let message = enhanced.message.clone();
    if message.contains("Failed to execute command") && message.contains("luac") {
        enhanced = enhanced
            .with_suggestion("Install Lua so that luac is on your PATH")
            .with_help("Set lint_compiler in .tbrc to use another parse-only checker");
    } else if message.contains("Failed to execute command") && message.contains("nvim") {
        enhanced = enhanced
            .with_suggestion("Install Neovim so that nvim is on your PATH")
            .with_help("Set nvim_binary in .tbrc to point at a specific Neovim build");
    } else if message.contains("timed out") {
        enhanced = enhanced.with_suggestion("Raise smoke_timeout in .tbrc");
    } else if message.contains("missing source directory") {
        enhanced = enhanced.with_suggestion(
            "Run tbtool lint from the plugin root or pass the directory: tbtool lint <DIR>",
        );
    } else if message.contains("config") {
        enhanced = enhanced.with_help("Run 'tbtool init' to write a commented .tbrc with every key");
    }

    enhanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_target_suggestion() {
        let io = std::io::Error::new(ErrorKind::NotFound, "No such file or directory");
        let err = anyhow::Error::new(DocumentError::read("lua/x.lua", io));

        let enhanced = enhance_error(err);
        assert_eq!(enhanced.file.as_deref(), Some("lua/x.lua"));
        assert!(enhanced.suggestion.unwrap().contains("tbtool refactor <PATH>"));
    }

    #[test]
    fn test_registry_mismatch_suggestion() {
        let err = anyhow::Error::new(RegistryError::CountMismatch {
            path: PathBuf::from("index.json"),
            expected: 50,
            actual: 49,
        });

        let enhanced = enhance_error(err);
        assert!(enhanced.message.contains("exactly 50 themes, found 49"));
        assert!(enhanced.suggestion.unwrap().contains("index_expected_count"));
    }

    #[test]
    fn test_context_chain_is_kept() {
        let err = anyhow::anyhow!("No such file or directory")
            .context("Failed to execute command: luac");

        let enhanced = enhance_error(err);
        assert_eq!(enhanced.message, "Failed to execute command: luac");
        assert_eq!(enhanced.causes, vec!["No such file or directory".to_string()]);
        assert!(enhanced.suggestion.unwrap().contains("luac"));
    }
}
