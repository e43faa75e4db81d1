//! # tbtool-harness
//!
//! Checks run against a theme-browser.nvim checkout:
//!
//! - **Lint**: parse-only compiler check of every Lua file, failures aggregated
//! - **Registry**: JSON theme list assertions (required entry or exact size)
//! - **Smoke**: headless Neovim run that loads one theme from a fixture
//!
//! Subprocesses go through [`process::run_with_timeout`].

pub mod lint;
pub mod process;
pub mod registry;
pub mod smoke;

pub use lint::{LintFailure, LintOptions, LintReport, check_file, collect_source_files, run_lint};
pub use process::{CommandTimeout, run_with_timeout};
pub use registry::{RegistryError, RegistryExpectation, RegistrySummary, check_registry};
pub use smoke::{ColorschemeFixture, SmokeOptions, SmokeReport, nvim_args, run_smoke};
