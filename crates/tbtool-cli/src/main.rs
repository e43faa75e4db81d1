//! # tbtool
//!
//! Developer tooling for theme-browser.nvim.
//!
//! Without a subcommand, rewrites the gallery module's preamble so its
//! `require` calls become cached bindings. `lint` and `smoke` run the
//! syntax and runtime checks used before a release.

mod config;
mod errors;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tbtool_harness::{
    LintOptions, LintReport, RegistryExpectation, SmokeOptions, run_lint, run_smoke,
};
use tbtool_refactor::{PreambleTemplate, RefactorReport, RewriteOptions, WriteMode, refactor_file};

use config::Config;
use errors::enhance_error;

#[derive(Parser)]
#[command(name = "tbtool")]
#[command(about = "Refactor, lint and smoke-test theme-browser.nvim", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read this config file instead of searching for .tbrc
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Rewrite preamble require() declarations into cached bindings")]
    Refactor(RefactorArgs),
    #[command(about = "Syntax-check every Lua file with a parse-only compiler")]
    Lint(LintArgs),
    #[command(about = "Check the theme registry and load a theme in headless Neovim")]
    Smoke(SmokeArgs),
    #[command(about = "Write a default .tbrc in the current directory")]
    Init,
}

#[derive(Args, Default)]
struct RefactorArgs {
    /// File to rewrite (defaults to refactor_target)
    path: Option<PathBuf>,
    /// Report substitutions without writing the file
    #[arg(long)]
    dry_run: bool,
    /// Line number after which the preamble may start
    #[arg(long)]
    threshold: Option<usize>,
    /// Only rewrite require() calls under this namespace
    #[arg(long)]
    namespace: Option<String>,
    /// File whose lines mark the start of the preamble
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Overwrite the file directly instead of renaming a temporary file over it
    #[arg(long)]
    in_place: bool,
}

#[derive(Args)]
struct LintArgs {
    /// Source directory (defaults to lint_source_dir)
    dir: Option<PathBuf>,
    /// Parse-only compiler to run on each file
    #[arg(long)]
    compiler: Option<String>,
    /// Number of files checked in parallel (0 = all cores)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Seconds before one file's check is reported as timed out
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Args)]
struct SmokeArgs {
    /// Plugin checkout to test
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Check the curated index for an exact theme count instead of the bundled registry
    #[arg(long)]
    curated: bool,
    /// Curated index file (implies --curated)
    #[arg(long, value_name = "FILE")]
    index: Option<PathBuf>,
    /// Expected number of themes in the curated index
    #[arg(long)]
    expect_count: Option<usize>,
    /// Only run the registry assertion
    #[arg(long)]
    skip_runtime: bool,
    /// Headless editor timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config).and_then(|config| match cli.command {
        None => refactor(&config, RefactorArgs::default()),
        Some(Commands::Refactor(args)) => refactor(&config, args),
        Some(Commands::Lint(args)) => lint(&config, args),
        Some(Commands::Smoke(args)) => smoke(&config, args),
        Some(Commands::Init) => init_config(),
    });

    let code = exit_code(&result);
    if let Err(e) = result {
        enhance_error(e).display();
    }
    std::process::exit(code);
}

/// `Ok(true)` is success; a failed check or an error exits with 1.
fn exit_code(result: &Result<bool>) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(&path),
        None => Config::load("."),
    }
}

fn refactor(config: &Config, args: RefactorArgs) -> Result<bool> {
    let mut config = config.clone();
    if let Some(threshold) = args.threshold {
        config = config.with_preamble_threshold(threshold);
    }
    if let Some(namespace) = args.namespace {
        config = config.with_require_namespace(namespace);
    }
    if args.in_place {
        config = config.with_atomic_write(false);
    }

    let mut options = RewriteOptions::new().with_threshold(config.preamble_threshold);
    if let Some(template) = args.template.or(config.preamble_template) {
        options = options.with_template(PreambleTemplate::from_file(&template)?);
    }
    if let Some(namespace) = config.require_namespace {
        options = options.with_namespace(namespace);
    }

    let mode = if config.atomic_write {
        WriteMode::Atomic
    } else {
        WriteMode::InPlace
    };
    let path = args.path.unwrap_or(config.refactor_target);

    tracing::info!(path = %path.display(), ?mode, dry_run = args.dry_run, "refactoring");
    let report = refactor_file(&path, &options, mode, args.dry_run)?;

    for line in refactor_report_lines(&report, &path) {
        println!("{}", line);
    }

    Ok(true)
}

fn refactor_report_lines(report: &RefactorReport, path: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for sub in &report.substitutions {
        lines.push(format!("{} {}", format!("Line {}:", sub.line_number).cyan(), sub.excerpt));
    }

    for collision in &report.collisions {
        lines.push(format!(
            "  {} line {}: {} is shared by {} and {}",
            "!".yellow().bold(),
            collision.line_number,
            collision.binding.name().bold(),
            collision.first_module,
            collision.module_path
        ));
    }

    lines.push(format!("Refactored {} lines", report.output_lines));
    if report.written() {
        lines.push("Replaced require() calls with cached variables".to_string());
    } else {
        lines.push(format!(
            "{} {}",
            "Dry run:".dimmed(),
            format!("{} was not modified", path.display()).dimmed()
        ));
    }

    lines
}

fn lint(config: &Config, args: LintArgs) -> Result<bool> {
    let dir = args.dir.unwrap_or_else(|| config.lint_source_dir.clone());
    if !dir.is_dir() {
        println!("missing source directory: {}", dir.display());
        return Ok(false);
    }

    let compiler = args.compiler.unwrap_or_else(|| config.lint_compiler.clone());
    let timeout = args.timeout.map(Duration::from_secs).unwrap_or(config.lint_timeout);
    let options = LintOptions::new(dir)
        .with_extension(config.lint_extension.clone())
        .with_compiler(compiler.clone(), vec!["-p".to_string()])
        .with_max_parallel_threads(args.jobs.unwrap_or(config.max_parallel_threads))
        .with_timeout(timeout);

    let report = run_lint(&options)?;

    for line in lint_report_lines(&report, &compiler) {
        println!("{}", line);
    }

    Ok(report.passed())
}

fn lint_report_lines(report: &LintReport, compiler: &str) -> Vec<String> {
    let mut lines = vec![format!("checked={}", report.checked)];

    if report.passed() {
        lines.push(format!("{} syntax checks passed", compiler));
    } else {
        for failure in &report.failures {
            lines.push(format!(
                "{}: {}",
                failure.path.display().to_string().red(),
                failure.detail
            ));
        }
    }

    lines
}

fn smoke(config: &Config, args: SmokeArgs) -> Result<bool> {
    let curated = args.curated || args.index.is_some();
    let config = match args.timeout {
        Some(secs) => config.clone().with_smoke_timeout(Duration::from_secs(secs)),
        None => config.clone(),
    };

    let mut options = SmokeOptions::new(&args.root);
    options.nvim = config.nvim_binary.clone();
    options.theme = config.required_theme.clone();
    options.variant = config.smoke_variant.clone();
    options.timeout = config.smoke_timeout;
    options.skip_runtime = args.skip_runtime;

    let label = if curated {
        options.registry = args.index.unwrap_or_else(|| config.index_path.clone());
        options.expectation = RegistryExpectation::ExactCount(
            args.expect_count.unwrap_or(config.index_expected_count),
        );
        "curated index"
    } else {
        options.registry = config.registry_path.clone();
        options.expectation = RegistryExpectation::ContainsTheme(config.required_theme.clone());
        "bundled registry"
    };

    let report = run_smoke(&options, |summary| {
        println!("{} OK ({} themes)", label, summary.themes);
    })?;

    if report.runtime_loaded {
        println!(
            "runtime load OK ({}:{} via {})",
            options.theme, options.variant, label
        );
    }

    Ok(true)
}

fn init_config() -> Result<bool> {
    let path = PathBuf::from(".tbrc");

    if path.exists() {
        println!("{} {} already exists", "ℹ".cyan(), path.display());
        return Ok(true);
    }

    fs::write(&path, Config::default_file_contents())
        .with_context(|| format!("Failed to write config to {:?}", path))?;
    println!("{} Created config: {}", "✓".green().bold(), path.display());

    Ok(true)
}
