//! Configuration for the `tbtool` commands.
//!
//! # Config file: `.tbrc`
//!
//! TOML, looked up in two places:
//!
//! - **Global**: `~/.tbrc`
//! - **Local**: `.tbrc` or `.tbtool/.tbrc`, searched upward from the working
//!   directory. Local values override global values.
//!
//! ```toml
//! refactor_target = "lua/theme-browser/ui/gallery.lua"
//! preamble_threshold = 25
//! require_namespace = "theme-browser"
//! lint_compiler = "luac"
//! smoke_timeout = 120
//! ```
//!
//! All fields are optional. Command-line flags override both files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// TOML-friendly intermediate representation (all fields optional).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    refactor_target: Option<PathBuf>,
    preamble_threshold: Option<usize>,
    /// File whose non-blank lines replace the built-in preamble template.
    preamble_template: Option<PathBuf>,
    require_namespace: Option<String>,
    atomic_write: Option<bool>,
    lint_source_dir: Option<PathBuf>,
    lint_extension: Option<String>,
    lint_compiler: Option<String>,
    /// Per-file compiler timeout in seconds.
    lint_timeout: Option<u64>,
    /// Max parallel lint threads (0 = all cores).
    max_parallel_threads: Option<usize>,
    nvim_binary: Option<String>,
    /// Headless editor timeout in seconds.
    smoke_timeout: Option<u64>,
    registry_path: Option<PathBuf>,
    required_theme: Option<String>,
    smoke_variant: Option<String>,
    index_path: Option<PathBuf>,
    index_expected_count: Option<usize>,
}

/// Effective configuration.
///
/// | Setting | Default |
/// |---------|---------|
/// | `refactor_target` | `lua/theme-browser/ui/gallery.lua` |
/// | `preamble_threshold` | 25 |
/// | `preamble_template` | built-in gallery preamble |
/// | `require_namespace` | `None` (any dotted path) |
/// | `atomic_write` | `true` |
/// | `lint_source_dir` | `lua` |
/// | `lint_extension` | `lua` |
/// | `lint_compiler` | `luac` |
/// | `lint_timeout` | 30 s |
/// | `max_parallel_threads` | `0` |
/// | `nvim_binary` | `nvim` |
/// | `smoke_timeout` | 60 s |
/// | `registry_path` | `lua/theme-browser/data/registry.json` |
/// | `required_theme` | `tokyonight` |
/// | `smoke_variant` | `night` |
/// | `index_path` | `lua/theme-browser/data/index.json` |
/// | `index_expected_count` | 50 |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub refactor_target: PathBuf,
    pub preamble_threshold: usize,
    pub preamble_template: Option<PathBuf>,
    pub require_namespace: Option<String>,
    pub atomic_write: bool,
    pub lint_source_dir: PathBuf,
    pub lint_extension: String,
    pub lint_compiler: String,
    pub lint_timeout: Duration,
    pub max_parallel_threads: usize,
    pub nvim_binary: String,
    pub smoke_timeout: Duration,
    pub registry_path: PathBuf,
    pub required_theme: String,
    pub smoke_variant: String,
    pub index_path: PathBuf,
    pub index_expected_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refactor_target: PathBuf::from(tbtool_refactor::DEFAULT_TARGET),
            preamble_threshold: tbtool_refactor::DEFAULT_THRESHOLD,
            preamble_template: None,
            require_namespace: None,
            atomic_write: true,
            lint_source_dir: PathBuf::from("lua"),
            lint_extension: "lua".to_string(),
            lint_compiler: "luac".to_string(),
            lint_timeout: Duration::from_secs(30),
            max_parallel_threads: 0,
            nvim_binary: "nvim".to_string(),
            smoke_timeout: Duration::from_secs(60),
            registry_path: PathBuf::from(tbtool_harness::smoke::BUNDLED_REGISTRY),
            required_theme: "tokyonight".to_string(),
            smoke_variant: "night".to_string(),
            index_path: PathBuf::from("lua/theme-browser/data/index.json"),
            index_expected_count: 50,
        }
    }
}

impl Config {
    /// Loads `~/.tbrc`, then overlays the nearest local `.tbrc` found from
    /// `start_dir` upward. Returns defaults if neither exists.
    pub fn load(start_dir: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::find_global_config() {
            let file = Self::read_file(&global_path)?;
            config.merge(file);
        }

        if let Some(local_path) = Self::find_local_config(start_dir) {
            let file = Self::read_file(&local_path)?;
            config.merge(file);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::read_file(path)?);
        Ok(config)
    }

    /// Parses configuration from a TOML string on top of the defaults.
    pub fn from_str(toml_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml_str).context("Failed to parse config")?;
        let mut config = Self::default();
        config.merge(file);
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn merge(&mut self, file: ConfigFile) {
        if let Some(v) = file.refactor_target {
            self.refactor_target = v;
        }
        if let Some(v) = file.preamble_threshold {
            self.preamble_threshold = v;
        }
        if file.preamble_template.is_some() {
            self.preamble_template = file.preamble_template;
        }
        if file.require_namespace.is_some() {
            self.require_namespace = file.require_namespace;
        }
        if let Some(v) = file.atomic_write {
            self.atomic_write = v;
        }
        if let Some(v) = file.lint_source_dir {
            self.lint_source_dir = v;
        }
        if let Some(v) = file.lint_extension {
            self.lint_extension = v;
        }
        if let Some(v) = file.lint_compiler {
            self.lint_compiler = v;
        }
        if let Some(secs) = file.lint_timeout {
            self.lint_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = file.max_parallel_threads {
            self.max_parallel_threads = v;
        }
        if let Some(v) = file.nvim_binary {
            self.nvim_binary = v;
        }
        if let Some(secs) = file.smoke_timeout {
            self.smoke_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = file.registry_path {
            self.registry_path = v;
        }
        if let Some(v) = file.required_theme {
            self.required_theme = v;
        }
        if let Some(v) = file.smoke_variant {
            self.smoke_variant = v;
        }
        if let Some(v) = file.index_path {
            self.index_path = v;
        }
        if let Some(v) = file.index_expected_count {
            self.index_expected_count = v;
        }
    }

    fn find_global_config() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tbrc")).filter(|p| p.is_file())
    }

    /// Walks up from `start_dir` looking for `.tbrc` or `.tbtool/.tbrc`.
    fn find_local_config(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start_dir.as_ref().to_path_buf();

        if let Ok(abs) = dir.canonicalize() {
            dir = abs;
        }

        loop {
            let rc_file = dir.join(".tbrc");
            if rc_file.is_file() {
                return Some(rc_file);
            }

            let nested = dir.join(".tbtool").join(".tbrc");
            if nested.is_file() {
                return Some(nested);
            }

            if !dir.pop() {
                return None;
            }
        }
    }

    pub fn with_preamble_threshold(mut self, threshold: usize) -> Self {
        self.preamble_threshold = threshold;
        self
    }

    pub fn with_require_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.require_namespace = Some(namespace.into());
        self
    }

    pub fn with_atomic_write(mut self, atomic: bool) -> Self {
        self.atomic_write = atomic;
        self
    }

    pub fn with_smoke_timeout(mut self, timeout: Duration) -> Self {
        self.smoke_timeout = timeout;
        self
    }

    /// Commented default `.tbrc`, written by `tbtool init`.
    pub fn default_file_contents() -> &'static str {
        r#"# tbtool configuration

# File rewritten by `tbtool refactor` when no path is given
refactor_target = "lua/theme-browser/ui/gallery.lua"

# Cache declarations are only rewritten after this line number
preamble_threshold = 25

# Only rewrite require() calls under this namespace
# require_namespace = "theme-browser"

# Write through a temporary file and rename it into place
atomic_write = true

lint_source_dir = "lua"
lint_compiler = "luac"

# Seconds before a single file's syntax check is reported as timed out
lint_timeout = 30

# Parallel lint threads (0 = all cores)
max_parallel_threads = 0

nvim_binary = "nvim"

# Headless editor timeout in seconds
smoke_timeout = 60

registry_path = "lua/theme-browser/data/registry.json"
required_theme = "tokyonight"
smoke_variant = "night"

index_path = "lua/theme-browser/data/index.json"
index_expected_count = 50
"#
    }
}
