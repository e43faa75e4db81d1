//! # tbtool-refactor
//!
//! Rewrites `require("namespace.module")` cache declarations in a Lua
//! module's preamble into memoized, lazily loaded bindings.
//!
//! ## Overview
//!
//! - **Loader**: reads a file into a [`SourceDocument`]
//! - **Rewriter**: one pass over the lines with an explicit [`Region`] state
//!   machine and a set of seen [`CacheBinding`]s
//! - **Writer**: replaces the file, atomically by default
//!
//! ## Pipeline
//!
//! ```text
//! path
//!   ↓
//! SourceDocument::load
//!   ↓
//! Rewriter::rewrite  (BeforePreamble → InPreamble)
//!   ↓
//! write_document
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tbtool_refactor::{RewriteOptions, Rewriter, SourceDocument};
//!
//! let source = "local M = {}\nlocal state_cache = state_cache or require(\"theme-browser.state\")\n";
//! let doc = SourceDocument::from_source(source);
//!
//! let outcome = Rewriter::new(RewriteOptions::new().with_threshold(0)).rewrite(&doc);
//!
//! assert_eq!(outcome.substitutions.len(), 1);
//! assert_eq!(outcome.document.len(), 3);
//! ```
//!
//! Only lines past the threshold, after a preamble template line has been
//! seen, are candidates. Everything else is copied verbatim and the scan
//! never fails on unexpected input.

pub mod document;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod region;
pub mod rewriter;
pub mod writer;

pub use document::SourceDocument;
pub use error::DocumentError;
pub use pattern::{CacheBinding, ModuleReference, find_require};
pub use pipeline::{RefactorReport, refactor_file};
pub use region::{DEFAULT_THRESHOLD, GALLERY_PREAMBLE, PreambleTemplate, Region};
pub use rewriter::{Collision, RewriteOptions, RewriteOutcome, Rewriter, Substitution, rewrite};
pub use writer::{WriteMode, WriteSummary, write_document};

/// File the reference tooling rewrites when no path is given.
pub const DEFAULT_TARGET: &str = "lua/theme-browser/ui/gallery.lua";
