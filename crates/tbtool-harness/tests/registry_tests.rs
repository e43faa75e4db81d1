use std::fs;
use std::path::{Path, PathBuf};
use tbtool_harness::{RegistryError, RegistryExpectation, check_registry};
use tempfile::TempDir;

fn write_themes(dir: &Path, file: &str, count: usize) -> PathBuf {
    let themes: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"name": "theme-{}", "repo": "owner/theme-{}.nvim"}}"#, i, i))
        .collect();
    let path = dir.join(file);
    fs::write(&path, format!("[{}]", themes.join(","))).unwrap();
    path
}

#[test]
fn test_curated_index_with_exact_count() {
    let dir = TempDir::new().unwrap();
    let path = write_themes(dir.path(), "index.json", 50);

    let summary = check_registry(&path, &RegistryExpectation::ExactCount(50)).unwrap();
    assert_eq!(summary.themes, 50);
}

#[test]
fn test_curated_index_count_mismatch() {
    let dir = TempDir::new().unwrap();

    for count in [49, 51] {
        let path = write_themes(dir.path(), &format!("index-{}.json", count), count);
        let err = check_registry(&path, &RegistryExpectation::ExactCount(50)).unwrap_err();
        match err {
            RegistryError::CountMismatch { expected, actual, .. } => {
                assert_eq!(expected, 50);
                assert_eq!(actual, count);
            }
            other => panic!("Expected CountMismatch, got {:?}", other),
        }
    }
}

#[test]
fn test_bundled_registry_contains_tokyonight() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    fs::write(
        &path,
        r#"[{"name": "catppuccin"}, "stray", {"name": "tokyonight", "variants": ["night", "storm"]}]"#,
    )
    .unwrap();

    let summary =
        check_registry(&path, &RegistryExpectation::ContainsTheme("tokyonight".into())).unwrap();
    assert_eq!(summary.themes, 3);
}

#[test]
fn test_bundled_registry_missing_theme() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    fs::write(&path, r#"[{"name": "catppuccin"}, {"title": "tokyonight"}]"#).unwrap();

    let err = check_registry(&path, &RegistryExpectation::ContainsTheme("tokyonight".into()))
        .unwrap_err();
    assert!(matches!(err, RegistryError::MissingTheme { ref name, .. } if name == "tokyonight"));
    assert!(err.to_string().contains("to include tokyonight"));
}

#[test]
fn test_empty_or_non_list_registry() {
    let dir = TempDir::new().unwrap();

    for (file, body) in [("empty.json", "[]"), ("object.json", r#"{"name": "tokyonight"}"#)] {
        let path = dir.path().join(file);
        fs::write(&path, body).unwrap();
        let err = check_registry(&path, &RegistryExpectation::ExactCount(1)).unwrap_err();
        assert!(matches!(err, RegistryError::Empty { .. }), "{}: {:?}", file, err);
    }
}

#[test]
fn test_invalid_json_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{").unwrap();
    let err = check_registry(&path, &RegistryExpectation::ExactCount(1)).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));

    let missing = dir.path().join("missing.json");
    let err = check_registry(&missing, &RegistryExpectation::ExactCount(1)).unwrap_err();
    assert!(matches!(err, RegistryError::Read { .. }));
}
