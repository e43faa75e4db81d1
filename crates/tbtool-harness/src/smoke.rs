//! Runtime smoke test: load one theme in a headless Neovim.
//!
//! A throwaway colorscheme is written to a temporary runtime directory so the
//! plugin can resolve `<theme>-<variant>` without any theme plugin installed.
//! The directory lives exactly as long as its [`ColorschemeFixture`].

use crate::process::{failure_detail, run_with_timeout};
use crate::registry::{RegistryExpectation, RegistrySummary, check_registry};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

pub const BUNDLED_REGISTRY: &str = "lua/theme-browser/data/registry.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeOptions {
    pub plugin_root: PathBuf,
    pub nvim: String,
    pub theme: String,
    pub variant: String,
    pub registry: PathBuf,
    pub expectation: RegistryExpectation,
    pub timeout: Duration,
    pub skip_runtime: bool,
}

impl SmokeOptions {
    pub fn new(plugin_root: impl Into<PathBuf>) -> Self {
        let theme = "tokyonight".to_string();
        Self {
            plugin_root: plugin_root.into(),
            nvim: "nvim".to_string(),
            expectation: RegistryExpectation::ContainsTheme(theme.clone()),
            theme,
            variant: "night".to_string(),
            registry: PathBuf::from(BUNDLED_REGISTRY),
            timeout: Duration::from_secs(60),
            skip_runtime: false,
        }
    }

    /// Registry path resolved against the plugin root.
    pub fn registry_path(&self) -> PathBuf {
        self.plugin_root.join(&self.registry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeReport {
    pub registry: RegistrySummary,
    pub runtime_loaded: bool,
}

pub struct ColorschemeFixture {
    dir: TempDir,
    colorscheme: PathBuf,
}

impl ColorschemeFixture {
    pub fn create(theme: &str, variant: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("tb-colors-")
            .tempdir()
            .context("Failed to create fixture directory")?;

        let colors_dir = dir.path().join("colors");
        std::fs::create_dir_all(&colors_dir)
            .with_context(|| format!("Failed to create {}", colors_dir.display()))?;

        let name = format!("{}-{}", theme, variant);
        let colorscheme = colors_dir.join(format!("{}.vim", name));
        std::fs::write(&colorscheme, format!("hi clear\nlet g:colors_name = \"{}\"\n", name))
            .with_context(|| format!("Failed to write {}", colorscheme.display()))?;

        tracing::debug!(dir = %dir.path().display(), "created colorscheme fixture");
        Ok(Self { dir, colorscheme })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn colorscheme(&self) -> &Path {
        &self.colorscheme
    }
}

/// Arguments for `nvim` that set up the plugin and load `theme:variant`.
pub fn nvim_args(
    plugin_root: &Path,
    fixture_root: &Path,
    theme: &str,
    variant: &str,
) -> Vec<String> {
    vec![
        "--headless".to_string(),
        "-u".to_string(),
        "NONE".to_string(),
        format!("+set rtp+={}", fixture_root.display()),
        format!("+set rtp+={}", plugin_root.display()),
        r#"+lua require("theme-browser").setup({ auto_load = false, package_manager = { enabled = false, mode = "plugin_only" } })"#
            .to_string(),
        format!(
            r#"+lua local r=require("theme-browser.adapters.base").load_theme("{}","{}",{{notify=false}}); assert(r.ok, "theme load failed")"#,
            theme, variant
        ),
        "+qa".to_string(),
    ]
}

pub fn run_runtime_load(options: &SmokeOptions, fixture: &ColorschemeFixture) -> Result<()> {
    let mut cmd = Command::new(&options.nvim);
    cmd.args(nvim_args(
        &options.plugin_root,
        fixture.root(),
        &options.theme,
        &options.variant,
    ))
    .current_dir(&options.plugin_root);

    let output = run_with_timeout(&mut cmd, options.timeout)?;
    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            options.nvim,
            output.status,
            failure_detail(&output)
        );
    }
    Ok(())
}

/// Registry assertion, then the headless load. `on_registry` is called as
/// soon as the registry passes, before the editor is started.
pub fn run_smoke(
    options: &SmokeOptions,
    on_registry: impl FnOnce(&RegistrySummary),
) -> Result<SmokeReport> {
    let registry = check_registry(&options.registry_path(), &options.expectation)?;
    on_registry(&registry);

    if options.skip_runtime {
        return Ok(SmokeReport {
            registry,
            runtime_loaded: false,
        });
    }

    let fixture = ColorschemeFixture::create(&options.theme, &options.variant)?;
    run_runtime_load(options, &fixture)?;

    Ok(SmokeReport {
        registry,
        runtime_loaded: true,
    })
}
