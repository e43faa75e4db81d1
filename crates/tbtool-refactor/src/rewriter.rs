//! Single pass over a [`SourceDocument`] that turns cache declarations in
//! the module preamble into memoized `require` bindings.

use crate::document::SourceDocument;
use crate::pattern::{CacheBinding, ModuleReference, find_require};
use crate::region::{DEFAULT_THRESHOLD, PreambleTemplate, Region};
use std::collections::BTreeMap;

/// Indentation of the generated canonical declaration.
const REPLACEMENT_INDENT: &str = "  ";
/// Number of characters of the source line quoted in a substitution report.
const EXCERPT_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    pub threshold: usize,
    pub template: PreambleTemplate,
    /// Only module paths under `<namespace>.` are rewritten when set.
    pub namespace: Option<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            template: PreambleTemplate::default(),
            namespace: None,
        }
    }
}

impl RewriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_template(mut self, template: PreambleTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// One declaration rewritten into its cached form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// 1-indexed line number in the input document.
    pub line_number: usize,
    pub module_path: String,
    pub binding: CacheBinding,
    /// First characters of the trimmed input line.
    pub excerpt: String,
}

/// Two module paths sharing a trailing segment, and therefore one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub line_number: usize,
    pub binding: CacheBinding,
    pub first_module: String,
    pub module_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub document: SourceDocument,
    pub substitutions: Vec<Substitution>,
    pub collisions: Vec<Collision>,
    /// Bindings seen during the scan, mapped to the module that first claimed them.
    pub bindings: BTreeMap<CacheBinding, String>,
    pub region: Region,
}

impl RewriteOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// Mutable state carried from one line to the next.
#[derive(Debug, Default)]
struct ScanState {
    line_number: usize,
    region: Region,
    bindings: BTreeMap<CacheBinding, String>,
    substitutions: Vec<Substitution>,
    collisions: Vec<Collision>,
}

impl ScanState {
    fn claim(&mut self, binding: &CacheBinding, module: &ModuleReference) {
        match self.bindings.get(binding) {
            Some(first) if *first != module.module_path => {
                tracing::warn!(
                    line = self.line_number,
                    binding = binding.name(),
                    first = %first,
                    module = %module.module_path,
                    "cache binding name collision"
                );
                self.collisions.push(Collision {
                    line_number: self.line_number,
                    binding: binding.clone(),
                    first_module: first.clone(),
                    module_path: module.module_path.clone(),
                });
            }
            Some(_) => {}
            None => {
                self.bindings.insert(binding.clone(), module.module_path.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    options: RewriteOptions,
}

impl Rewriter {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }

    /// Produces the rewritten document. Lines are only ever passed through or
    /// expanded, so the output is never shorter than the input.
    pub fn rewrite(&self, input: &SourceDocument) -> RewriteOutcome {
        let mut state = ScanState::default();
        let mut output = Vec::with_capacity(input.len());

        for line in input.lines() {
            state.line_number += 1;
            self.step(&mut state, line, &mut output);
        }

        RewriteOutcome {
            document: SourceDocument::new(output, input.has_trailing_newline()),
            substitutions: state.substitutions,
            collisions: state.collisions,
            bindings: state.bindings,
            region: state.region,
        }
    }

    fn step(&self, state: &mut ScanState, line: &str, output: &mut Vec<String>) {
        let trimmed = line.trim();
        state.region = state.region.advance(
            state.line_number,
            trimmed,
            &self.options.template,
            self.options.threshold,
        );

        if !state.region.is_preamble() {
            output.push(line.to_string());
            return;
        }

        let Some(module) = self.candidate(trimmed) else {
            output.push(line.to_string());
            return;
        };

        let binding = module.binding();
        if !binding.is_declared_by(trimmed) {
            output.push(line.to_string());
            return;
        }

        state.claim(&binding, &module);

        if trimmed == binding.canonical_declaration(&module.module_path) {
            tracing::debug!(line = state.line_number, binding = binding.name(), "already cached");
            output.push(line.to_string());
            return;
        }

        output.push(format!(
            "{}{}",
            REPLACEMENT_INDENT,
            binding.canonical_declaration(&module.module_path)
        ));
        output.push(binding.bare_reference(&module.module_path));

        tracing::info!(
            line = state.line_number,
            module = %module.module_path,
            binding = binding.name(),
            "cached require"
        );
        state.substitutions.push(Substitution {
            line_number: state.line_number,
            module_path: module.module_path,
            binding,
            excerpt: trimmed.chars().take(EXCERPT_CHARS).collect(),
        });
    }

    fn candidate(&self, trimmed: &str) -> Option<ModuleReference> {
        let module = find_require(trimmed)?;
        match &self.options.namespace {
            Some(ns) if !module.is_under(ns) => None,
            _ => Some(module),
        }
    }
}

/// Rewrites `input` with the given options.
pub fn rewrite(input: &SourceDocument, options: &RewriteOptions) -> RewriteOutcome {
    Rewriter::new(options.clone()).rewrite(input)
}
