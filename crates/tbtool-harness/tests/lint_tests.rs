use anyhow::Result;
use std::fs;
use std::time::Duration;
use tbtool_harness::{LintOptions, collect_source_files, run_lint};
use tempfile::TempDir;

/// A stand-in for `luac -p` that rejects any file whose name starts with "bad".
fn fake_compiler(options: LintOptions) -> LintOptions {
    let script = r#"case "$(basename "$1")" in bad*) echo "$1:1: unexpected symbol near 'end'" >&2; exit 1;; esac"#;
    options.with_compiler("sh", vec!["-c".into(), script.into(), "luac".into()])
}

fn plugin_tree() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let lua = dir.path().join("lua").join("theme-browser");
    fs::create_dir_all(lua.join("ui"))?;
    fs::write(lua.join("init.lua"), "return {}\n")?;
    fs::write(lua.join("ui").join("gallery.lua"), "local M = {}\nreturn M\n")?;
    fs::write(lua.join("ui").join("bad_popup.lua"), "end\n")?;
    fs::write(lua.join("bad_state.lua"), "end\n")?;
    fs::write(lua.join("README.md"), "not lua\n")?;
    Ok(dir)
}

#[test]
fn test_collect_is_recursive_and_sorted() -> Result<()> {
    let dir = plugin_tree()?;
    let files = collect_source_files(&dir.path().join("lua"), "lua")?;

    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "lua/theme-browser/bad_state.lua",
            "lua/theme-browser/init.lua",
            "lua/theme-browser/ui/bad_popup.lua",
            "lua/theme-browser/ui/gallery.lua",
        ]
    );
    Ok(())
}

#[test]
fn test_lint_aggregates_every_failure() -> Result<()> {
    let dir = plugin_tree()?;
    let options = fake_compiler(LintOptions::new(dir.path().join("lua")));

    let report = run_lint(&options)?;

    assert_eq!(report.checked, 4);
    assert!(!report.passed());
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].path.ends_with("bad_state.lua"));
    assert!(report.failures[1].path.ends_with("bad_popup.lua"));
    assert!(report.failures[0].detail.contains("unexpected symbol near 'end'"));
    Ok(())
}

#[test]
fn test_lint_passes_on_clean_tree() -> Result<()> {
    let dir = TempDir::new()?;
    let lua = dir.path().join("lua");
    fs::create_dir_all(&lua)?;
    fs::write(lua.join("ok.lua"), "return 1\n")?;

    let options = fake_compiler(LintOptions::new(&lua)).with_max_parallel_threads(2);
    let report = run_lint(&options)?;

    assert_eq!(report.checked, 1);
    assert!(report.passed());
    Ok(())
}

#[test]
fn test_lint_missing_source_directory() {
    let dir = TempDir::new().unwrap();
    let err = run_lint(&LintOptions::new(dir.path().join("lua"))).unwrap_err();
    assert!(err.to_string().starts_with("missing source directory:"));
}

#[test]
fn test_lint_custom_extension() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a.tl"), "")?;
    fs::write(dir.path().join("b.lua"), "")?;

    let options = fake_compiler(LintOptions::new(dir.path())).with_extension("tl");
    let report = run_lint(&options)?;
    assert_eq!(report.checked, 1);
    Ok(())
}

#[test]
fn test_hanging_file_is_reported_with_the_rest() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a_ok.lua"), "return 1\n")?;
    fs::write(dir.path().join("b_bad.lua"), "end\n")?;
    fs::write(dir.path().join("c_hang.lua"), "return 2\n")?;

    let script = r#"case "$(basename "$1")" in
        b_*) echo "$1:1: unexpected symbol near 'end'" >&2; exit 1;;
        c_*) exec sleep 5;;
    esac"#;
    let options = LintOptions::new(dir.path())
        .with_compiler("sh", vec!["-c".into(), script.into(), "luac".into()])
        .with_timeout(Duration::from_millis(300));

    let report = run_lint(&options)?;

    assert_eq!(report.checked, 3);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].path.ends_with("b_bad.lua"));
    assert!(report.failures[0].detail.contains("unexpected symbol"));
    assert!(report.failures[1].path.ends_with("c_hang.lua"));
    assert!(report.failures[1].detail.contains("timed out after 300ms"));
    Ok(())
}

#[test]
fn test_unlaunchable_compiler_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("a.lua"), "return 1\n")?;

    let options = LintOptions::new(dir.path()).with_compiler("tbtool-no-such-luac", vec![]);
    let err = run_lint(&options).unwrap_err();
    assert!(err.to_string().contains("Failed to execute command"));
    Ok(())
}
