use crate::error::DocumentError;
use std::collections::HashSet;
use std::path::Path;

/// Module preamble of `lua/theme-browser/ui/gallery.lua`. Its non-blank
/// lines mark the start of the cache-declaration region.
pub const GALLERY_PREAMBLE: &str = r#"local M = {}

local has_nui_popup, NuiPopup = pcall(require, "nui.popup")
local has_nui_split, NuiSplit = pcall(require, "nui.split")

local config_cache = nil
local state_cache = nil
local registry_cache = nil
local fuzzy_cache = nil

local gallery_popup = nil
local preview_split = nil
local all_themes = {}
local themes = {}
local current_index = 1
local search_query = ""
local fuzzy_matches = {}
local expanded_variants = {}
local marked_themes = {}
local filter = {
  mode = "all",
  tag = nil,
}
local original_buffer = nil
"#;

/// Line number after which template lines may open the preamble region.
pub const DEFAULT_THRESHOLD: usize = 25;

/// Where the scanner is relative to the cache-declaration preamble.
///
/// The only transition is `BeforePreamble -> InPreamble`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    BeforePreamble,
    InPreamble,
}

impl Region {
    pub fn advance(
        self,
        line_number: usize,
        trimmed: &str,
        template: &PreambleTemplate,
        threshold: usize,
    ) -> Region {
        match self {
            Region::InPreamble => Region::InPreamble,
            Region::BeforePreamble => {
                if line_number > threshold && template.contains(trimmed) {
                    Region::InPreamble
                } else {
                    Region::BeforePreamble
                }
            }
        }
    }

    pub fn is_preamble(self) -> bool {
        self == Region::InPreamble
    }
}

/// Set of exact, trimmed, non-empty lines reserved for the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreambleTemplate {
    lines: HashSet<String>,
}

impl PreambleTemplate {
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Template {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn contains(&self, trimmed: &str) -> bool {
        self.lines.contains(trimmed)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for PreambleTemplate {
    fn default() -> Self {
        Self::from_text(GALLERY_PREAMBLE)
    }
}
