//! Syntax-only checks of every plugin source file.
//!
//! Each file is handed to an external compiler in parse-only mode
//! (`luac -p <file>` by default). A failing file never stops the run; all
//! diagnostics are collected and reported together.

use crate::process::{CommandTimeout, failure_detail, run_with_timeout};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    pub source_root: PathBuf,
    pub extension: String,
    pub compiler: String,
    /// Arguments placed before the file path.
    pub compiler_args: Vec<String>,
    /// `0` uses the global rayon pool.
    pub max_parallel_threads: usize,
    pub timeout: Duration,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("lua"),
            extension: "lua".to_string(),
            compiler: "luac".to_string(),
            compiler_args: vec!["-p".to_string()],
            max_parallel_threads: 0,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LintOptions {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            ..Self::default()
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>, args: Vec<String>) -> Self {
        self.compiler = compiler.into();
        self.compiler_args = args;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_max_parallel_threads(mut self, n: usize) -> Self {
        self.max_parallel_threads = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFailure {
    pub path: PathBuf,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LintReport {
    pub checked: usize,
    pub failures: Vec<LintFailure>,
}

impl LintReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// All files under `root` with the given extension, sorted by path.
pub fn collect_source_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let pattern = root.join("**").join(format!("*.{}", extension));
    let pattern = pattern.to_string_lossy();

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid glob pattern: {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Checks one file. `Ok(None)` means it passed. A compiler that hangs past
/// the timeout counts as a failure for that file; only a compiler that cannot
/// be started is an error.
pub fn check_file(path: &Path, options: &LintOptions) -> Result<Option<LintFailure>> {
    let mut cmd = Command::new(&options.compiler);
    cmd.args(&options.compiler_args).arg(path);

    let output = match run_with_timeout(&mut cmd, options.timeout) {
        Ok(output) => output,
        Err(err) if err.downcast_ref::<CommandTimeout>().is_some() => {
            tracing::warn!(path = %path.display(), "syntax check timed out");
            return Ok(Some(LintFailure {
                path: path.to_path_buf(),
                detail: err.to_string(),
            }));
        }
        Err(err) => return Err(err),
    };
    if output.status.success() {
        tracing::debug!(path = %path.display(), "syntax ok");
        return Ok(None);
    }

    tracing::debug!(path = %path.display(), status = ?output.status, "syntax check failed");
    Ok(Some(LintFailure {
        path: path.to_path_buf(),
        detail: failure_detail(&output),
    }))
}

pub fn run_lint(options: &LintOptions) -> Result<LintReport> {
    if !options.source_root.is_dir() {
        bail!("missing source directory: {}", options.source_root.display());
    }

    let files = collect_source_files(&options.source_root, &options.extension)?;

    let check_all = || -> Vec<Result<Option<LintFailure>>> {
        files.par_iter().map(|path| check_file(path, options)).collect()
    };

    let results = if options.max_parallel_threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_parallel_threads)
            .build()
            .context("Failed to create thread pool")?;
        pool.install(check_all)
    } else {
        check_all()
    };

    let mut failures = Vec::new();
    for result in results {
        if let Some(failure) = result? {
            failures.push(failure);
        }
    }

    Ok(LintReport {
        checked: files.len(),
        failures,
    })
}
