//! Recognition of `require("namespace.identifier")` calls and cache-binding
//! name derivation.

use once_cell::sync::Lazy;
use regex::Regex;

static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\(\s*["']([A-Za-z_][\w-]*(?:\.[\w-]+)*\.(\w+))["']\s*\)"#)
        .expect("Valid regex pattern for require calls")
});

/// A module path found inside a `require(...)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// The matched call text, e.g. `require("theme-browser.config")`.
    pub raw: String,
    /// The dotted module path, e.g. `theme-browser.config`.
    pub module_path: String,
    /// The last path segment, e.g. `config`.
    pub segment: String,
}

impl ModuleReference {
    pub fn binding(&self) -> CacheBinding {
        CacheBinding::for_segment(&self.segment)
    }

    pub fn is_under(&self, namespace: &str) -> bool {
        self.module_path
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Returns the first `require("a.b")` call on `line`. Later calls on the same
/// line are ignored.
pub fn find_require(line: &str) -> Option<ModuleReference> {
    let caps = REQUIRE_CALL.captures(line)?;
    Some(ModuleReference {
        raw: caps.get(0)?.as_str().to_string(),
        module_path: caps.get(1)?.as_str().to_string(),
        segment: caps.get(2)?.as_str().to_string(),
    })
}

/// The module-level variable holding a memoized module table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheBinding {
    name: String,
}

impl CacheBinding {
    pub fn for_segment(segment: &str) -> Self {
        Self { name: format!("{}_cache", segment) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the trimmed line declares this binding (`local <name> = ...`).
    pub fn is_declared_by(&self, trimmed: &str) -> bool {
        trimmed.contains(&format!("local {} = ", self.name))
    }

    pub fn canonical_declaration(&self, module_path: &str) -> String {
        format!("local {0} = {0} or require('{1}')", self.name, module_path)
    }

    pub fn bare_reference(&self, module_path: &str) -> String {
        format!("local {} or require('{}')", self.name, module_path)
    }
}
