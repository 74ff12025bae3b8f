use pycompat::builders::merger::ConfigOverrides;
use pycompat::core::config::CheckConfiguration;
use pycompat::core::error::ConfigError;
use pycompat::utils;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn paths(items: &[&str]) -> BTreeSet<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

/// pyfile1.py, pyfile_dir1/pyfile2.py, pyfile_dir2/pyfile3.py, pyfile4.py
fn setup_source_tree() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::create_dir(root.join("pyfile_dir1")).unwrap();
    fs::create_dir(root.join("pyfile_dir2")).unwrap();
    for file in [
        "pyfile1.py",
        "pyfile_dir1/pyfile2.py",
        "pyfile_dir2/pyfile3.py",
        "pyfile4.py",
    ] {
        fs::write(root.join(file), "print('hello')\n").unwrap();
    }
    (dir, root)
}

fn resolved(root: &Path, files: &[&str]) -> BTreeSet<PathBuf> {
    files.iter().map(|file| root.join(file)).collect()
}

/// Spells `path` relative to the working directory, climbing out with `..`.
fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
    let mut relative = PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.join(path.strip_prefix("/").unwrap())
}

#[test]
fn test_round_trip_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.toml");
    let original = CheckConfiguration::new(
        Some(8),
        Some(10),
        Some(PathBuf::from("report.json")),
        paths(&["is_python_script/"]),
        paths(&["not_python_script/"]),
    );

    original.to_file(&path).unwrap();
    assert_eq!(CheckConfiguration::from_file(&path).unwrap(), original);
}

#[test]
fn test_round_trip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.json");
    let original = CheckConfiguration::new(
        Some(7),
        Some(12),
        None,
        paths(&["src", "tests/test_a.py"]),
        BTreeSet::new(),
    );

    original.to_file(&path).unwrap();
    assert_eq!(CheckConfiguration::from_file(&path).unwrap(), original);
}

#[test]
fn test_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.json");
    fs::write(
        &path,
        r#"{
            "min_version": 8,
            "max_version": 10,
            "include": ["is_python_script/"],
            "exclude": ["not_python_script/"]
        }"#,
    )
    .unwrap();

    let configuration = CheckConfiguration::from_file(&path).unwrap();
    assert_eq!(configuration.min_version(), Some(8));
    assert_eq!(configuration.max_version(), Some(10));
    assert_eq!(configuration.include(), &paths(&["is_python_script"]));
    assert_eq!(configuration.exclude(), &paths(&["not_python_script"]));
}

#[test]
fn test_from_toml_file_with_version_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.toml");
    fs::write(&path, "version = [8, 10]\ninclude = [\"src\"]\n").unwrap();

    let configuration = CheckConfiguration::from_file(&path).unwrap();
    assert_eq!(configuration.min_version(), Some(8));
    assert_eq!(configuration.max_version(), Some(10));
    assert_eq!(configuration.include(), &paths(&["src"]));
}

#[test]
fn test_from_file_rejects_missing_and_directories() {
    let dir = tempfile::tempdir().unwrap();

    let missing = CheckConfiguration::from_file(&dir.path().join("Compat.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read(_)));

    let not_a_file = CheckConfiguration::from_file(dir.path()).unwrap_err();
    assert!(matches!(not_a_file, ConfigError::Read(_)));
}

#[test]
fn test_from_file_rejects_unknown_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.yaml");
    fs::write(&path, "min_version: 8\n").unwrap();

    let err = CheckConfiguration::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read(_)));
}

#[test]
fn test_malformed_content_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Compat.json");
    fs::write(&path, "{ \"min_version\": ").unwrap();

    let err = CheckConfiguration::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_pyproject_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pyproject.toml");
    fs::write(&path, "[tool.black]\nline-length = 88\n").unwrap();

    let err = CheckConfiguration::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    assert_eq!(CheckConfiguration::discover(dir.path()).unwrap(), None);
}

#[test]
fn test_discover_prefers_compat_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Compat.json"),
        r#"{ "min_version": 6, "max_version": 7 }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("pyproject.toml"),
        "[tool.PyCompatibility]\nmin_version = 8\nmax_version = 10\n",
    )
    .unwrap();

    let configuration = CheckConfiguration::discover(dir.path()).unwrap().unwrap();
    assert_eq!(configuration.min_version(), Some(6));
    assert_eq!(configuration.max_version(), Some(7));
}

#[test]
fn test_discover_falls_back_to_pyproject() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"demo\"\n\n[tool.PyCompatibility]\nversion = [8, 10]\n",
    )
    .unwrap();

    let configuration = CheckConfiguration::discover(dir.path()).unwrap().unwrap();
    assert_eq!(configuration.min_version(), Some(8));
    assert_eq!(configuration.max_version(), Some(10));
}

#[test]
fn test_discover_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(CheckConfiguration::discover(dir.path()).unwrap(), None);
}

#[test]
fn test_resolve_requires_both_bounds() {
    let configuration = CheckConfiguration::new(
        None,
        Some(10),
        None,
        paths(&["/this/path/does/not/exist"]),
        BTreeSet::new(),
    );
    let err = configuration.check_and_resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("version"), "{err}");
}

#[test]
fn test_resolve_rejects_inverted_range() {
    let configuration =
        CheckConfiguration::new(Some(13), Some(10), None, BTreeSet::new(), BTreeSet::new());
    let err = configuration.check_and_resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_resolve_accepts_single_version() {
    let configuration =
        CheckConfiguration::new(Some(10), Some(10), None, BTreeSet::new(), BTreeSet::new());
    let resolved = configuration.check_and_resolve().unwrap();
    assert_eq!(resolved.min_version(), Some(10));
    assert_eq!(resolved.max_version(), Some(10));
    assert!(resolved.include().is_empty());
}

#[test]
fn test_resolve_expands_directories_and_subtracts_excludes() {
    let (_dir, root) = setup_source_tree();
    let configuration = CheckConfiguration::new(
        Some(8),
        Some(10),
        None,
        [
            root.join("pyfile1.py"),
            root.join("pyfile_dir1/pyfile2.py"),
            root.join("pyfile_dir2"),
        ]
        .into_iter()
        .collect(),
        [root.join("pyfile_dir1"), root.join("pyfile4.py")]
            .into_iter()
            .collect(),
    );

    let resolved_configuration = configuration.check_and_resolve().unwrap();
    assert_eq!(
        resolved_configuration.include(),
        &resolved(&root, &["pyfile1.py", "pyfile_dir2/pyfile3.py"])
    );
    assert!(resolved_configuration.exclude().is_empty());
    assert_eq!(resolved_configuration.min_version(), Some(8));
    assert_eq!(resolved_configuration.max_version(), Some(10));

    // Resolving again changes nothing.
    assert_eq!(
        resolved_configuration.check_and_resolve().unwrap(),
        resolved_configuration
    );
}

#[test]
fn test_resolve_collapses_duplicates() {
    let (_dir, root) = setup_source_tree();
    let configuration = CheckConfiguration::new(
        Some(8),
        Some(10),
        None,
        [
            root.clone(),
            root.join("pyfile1.py"),
            root.join("pyfile_dir1").join("..").join("pyfile1.py"),
        ]
        .into_iter()
        .collect(),
        BTreeSet::new(),
    );

    let resolved_configuration = configuration.check_and_resolve().unwrap();
    assert_eq!(
        resolved_configuration.include(),
        &resolved(
            &root,
            &[
                "pyfile1.py",
                "pyfile4.py",
                "pyfile_dir1/pyfile2.py",
                "pyfile_dir2/pyfile3.py",
            ]
        )
    );
}

#[test]
fn test_resolve_rejects_missing_paths() {
    let (_dir, root) = setup_source_tree();

    let include = CheckConfiguration::new(
        Some(8),
        Some(10),
        None,
        [root.join("missing.py")].into_iter().collect(),
        BTreeSet::new(),
    );
    let err = include.check_and_resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("missing.py"), "{err}");

    let exclude = CheckConfiguration::new(
        Some(8),
        Some(10),
        None,
        [root.join("pyfile1.py")].into_iter().collect(),
        [root.join("missing_dir")].into_iter().collect(),
    );
    assert!(matches!(
        exclude.check_and_resolve().unwrap_err(),
        ConfigError::Parse(_)
    ));
}

#[test]
fn test_resolve_canonicalizes_report() {
    let (_dir, root) = setup_source_tree();
    fs::write(root.join("report.json"), "{}").unwrap();

    let configuration = CheckConfiguration::new(
        Some(8),
        Some(10),
        Some(root.join("pyfile_dir1").join("..").join("report.json")),
        BTreeSet::new(),
        BTreeSet::new(),
    );
    let resolved_configuration = configuration.check_and_resolve().unwrap();
    assert_eq!(
        resolved_configuration.report(),
        Some(root.join("report.json").as_path())
    );

    let missing = CheckConfiguration::new(
        Some(8),
        Some(10),
        Some(root.join("absent.json")),
        BTreeSet::new(),
        BTreeSet::new(),
    );
    assert!(matches!(
        missing.check_and_resolve().unwrap_err(),
        ConfigError::Parse(_)
    ));
}

#[test]
fn test_overrides_win_over_file_values() {
    let file = CheckConfiguration::new(
        Some(6),
        Some(9),
        Some(PathBuf::from("file_report.json")),
        paths(&["src"]),
        paths(&["src/vendored"]),
    );
    let overrides = ConfigOverrides {
        min_version: Some(8),
        version: Some((1, 2)),
        include: vec![PathBuf::from("tests")],
        ..ConfigOverrides::default()
    };

    let merged = CheckConfiguration::from_dict(overrides.merge(Some(&file)).unwrap()).unwrap();
    assert_eq!(merged.min_version(), Some(8));
    assert_eq!(merged.max_version(), Some(9));
    assert_eq!(merged.report(), Some(Path::new("file_report.json")));
    assert_eq!(merged.include(), &paths(&["src", "tests"]));
    assert_eq!(merged.exclude(), &paths(&["src/vendored"]));
}

#[test]
fn test_version_override_fills_remaining_bounds() {
    let overrides = ConfigOverrides {
        max_version: Some(12),
        version: Some((7, 11)),
        ..ConfigOverrides::default()
    };

    let merged = CheckConfiguration::from_dict(overrides.merge(None).unwrap()).unwrap();
    assert_eq!(merged.min_version(), Some(7));
    assert_eq!(merged.max_version(), Some(12));
}

#[test]
fn test_run_check_with_discovered_configuration() {
    let (_dir, root) = setup_source_tree();
    fs::write(
        root.join("Compat.json"),
        serde_json::json!({
            "version": [8, 10],
            "include": [root.join("pyfile_dir2")],
        })
        .to_string(),
    )
    .unwrap();

    let overrides = ConfigOverrides {
        include: vec![root.join("pyfile1.py")],
        ..ConfigOverrides::default()
    };
    let configuration = utils::run_check(None, &root, overrides).unwrap();
    assert_eq!(
        configuration.include(),
        &resolved(&root, &["pyfile1.py", "pyfile_dir2/pyfile3.py"])
    );
}

#[test]
fn test_run_check_with_explicit_configuration_path() {
    let (_dir, root) = setup_source_tree();
    let config_path = root.join("settings.toml");
    CheckConfiguration::new(
        Some(9),
        Some(11),
        None,
        [root.join("pyfile4.py")].into_iter().collect(),
        BTreeSet::new(),
    )
    .to_file(&config_path)
    .unwrap();

    let configuration =
        utils::run_check(Some(config_path.as_path()), Path::new("/nonexistent"), ConfigOverrides::default())
            .unwrap();
    assert_eq!(configuration.min_version(), Some(9));
    assert_eq!(configuration.include(), &resolved(&root, &["pyfile4.py"]));
}

#[test]
fn test_run_check_without_versions_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = utils::run_check(None, dir.path(), ConfigOverrides::default()).unwrap_err();
    let err = err.downcast::<ConfigError>().unwrap();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_resolve_turns_relative_paths_absolute() {
    let (_dir, root) = setup_source_tree();
    let relative_root = relative_to_cwd(&root);
    assert!(relative_root.is_relative());

    let configuration = CheckConfiguration::new(
        Some(8),
        Some(10),
        Some(relative_root.join("pyfile_dir1").join("..").join("pyfile4.py")),
        [relative_root.clone()].into_iter().collect(),
        [relative_root.join("pyfile_dir1")].into_iter().collect(),
    )
    .check_and_resolve()
    .unwrap();

    assert!(configuration.include().iter().all(|path| path.is_absolute()));
    assert_eq!(
        configuration.include(),
        &resolved(&root, &["pyfile1.py", "pyfile_dir2/pyfile3.py", "pyfile4.py"])
    );
    assert!(configuration.exclude().is_empty());
    assert_eq!(configuration.report(), Some(root.join("pyfile4.py").as_path()));
}

#[test]
fn test_run_check_resolves_relative_paths_from_file() {
    let (_dir, root) = setup_source_tree();
    let relative_root = relative_to_cwd(&root);
    fs::write(
        root.join("Compat.json"),
        serde_json::json!({
            "version": [8, 10],
            "include": [
                relative_root.join("pyfile_dir1"),
                relative_root.join("pyfile_dir2").join("..").join("pyfile1.py"),
                relative_root.join("pyfile_dir2"),
            ],
            "exclude": [relative_root.join("pyfile_dir2").join("pyfile3.py")],
        })
        .to_string(),
    )
    .unwrap();

    let configuration = utils::run_check(None, &root, ConfigOverrides::default()).unwrap();
    assert!(configuration.include().iter().all(|path| path.is_absolute()));
    assert_eq!(
        configuration.include(),
        &resolved(&root, &["pyfile1.py", "pyfile_dir1/pyfile2.py"])
    );
    assert!(configuration.exclude().is_empty());
}
