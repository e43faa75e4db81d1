use anyhow::Result;
use std::fs;
use tbtool_refactor::{DocumentError, PreambleTemplate, RewriteOptions, WriteMode, refactor_file};
use tempfile::TempDir;

fn gallery_source() -> String {
    let mut source = String::from("-- gallery\n");
    for i in 0..24 {
        source.push_str(&format!("-- header line {}\n", i));
    }
    source.push_str("local M = {}\n");
    source.push_str("local has_nui_popup, NuiPopup = pcall(require, \"nui.popup\")\n");
    source.push_str("local config_cache = config_cache or require(\"theme-browser.config\")\n");
    source.push_str("local state_cache = state_cache or require(\"theme-browser.state\")\n");
    source.push_str("\nfunction M.open()\n  local r = require(\"theme-browser.registry\")\nend\n\nreturn M\n");
    source
}

#[test]
fn test_refactor_file_rewrites_and_reports() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("gallery.lua");
    fs::write(&path, gallery_source())?;

    let report = refactor_file(&path, &RewriteOptions::default(), WriteMode::Atomic, false)?;

    assert!(report.written());
    assert_eq!(report.substitutions.len(), 2);
    assert_eq!(report.output_lines, report.input_lines + 2);

    let written = fs::read_to_string(&path)?;
    let summary = report.write.expect("file was written");
    assert_eq!(summary.lines, report.output_lines);
    assert_eq!(summary.bytes, written.len());
    assert!(written.contains("  local config_cache = config_cache or require('theme-browser.config')\n"));
    assert!(written.contains("\nlocal state_cache or require('theme-browser.state')\n"));
    assert!(written.contains("  local r = require(\"theme-browser.registry\")\n"));
    assert!(written.ends_with("return M\n"));
    Ok(())
}

#[test]
fn test_refactor_file_twice_is_stable() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("gallery.lua");
    fs::write(&path, gallery_source())?;

    refactor_file(&path, &RewriteOptions::default(), WriteMode::InPlace, false)?;
    let first = fs::read(&path)?;

    let report = refactor_file(&path, &RewriteOptions::default(), WriteMode::InPlace, false)?;
    let second = fs::read(&path)?;

    assert_eq!(first, second);
    assert!(report.substitutions.is_empty());
    assert_eq!(report.input_lines, report.output_lines);
    Ok(())
}

#[test]
fn test_dry_run_leaves_file_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("gallery.lua");
    let source = gallery_source();
    fs::write(&path, &source)?;

    let report = refactor_file(&path, &RewriteOptions::default(), WriteMode::Atomic, true)?;

    assert!(!report.written());
    assert_eq!(report.write, None);
    assert_eq!(report.substitutions.len(), 2);
    assert_eq!(fs::read_to_string(&path)?, source);
    Ok(())
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.lua");

    let err = refactor_file(&path, &RewriteOptions::default(), WriteMode::Atomic, false)
        .unwrap_err();

    assert!(matches!(err, DocumentError::Read { .. }));
    assert!(!path.exists());
}

#[test]
fn test_custom_template_file() -> Result<()> {
    let dir = TempDir::new()?;
    let template_path = dir.path().join("preamble.lua");
    fs::write(&template_path, "local Picker = {}\n")?;
    let template = PreambleTemplate::from_file(&template_path)?;

    let path = dir.path().join("picker.lua");
    fs::write(
        &path,
        "local Picker = {}\nlocal util_cache = util_cache or require(\"theme-browser.util\")\n",
    )?;

    let options = RewriteOptions::new().with_threshold(0).with_template(template);
    let report = refactor_file(&path, &options, WriteMode::Atomic, false)?;

    assert_eq!(report.substitutions.len(), 1);
    assert_eq!(report.substitutions[0].line_number, 2);
    Ok(())
}
