use pkglock_core::{IdComparer, LockFileStore, LockValidation, LockValidator, StaleReason};
use pkglock_core::{CoreError, JsonSnapshotFile, SnapshotProvider};
use pkglock_schema::{parse_dgspec_str, parse_str, DependencyGraphSpec, Logger, ParsedLockFile};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingLogger {
    warnings: RefCell<Vec<String>>,
}

impl Logger for RecordingLogger {
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_owned());
    }
}

const APP_DGSPEC: &str = r#"{
  "restore": ["/repo/App/App.csproj"],
  "projects": [
    {
      "unique_name": "/repo/App/App.csproj",
      "name": "App",
      "base_directory": "/repo/App",
      "project_references": ["/repo/Lib/Lib.csproj"],
      "frameworks": [
        {
          "framework": "net6.0",
          "dependencies": [
            { "name": "PackageA", "range": "[1.0.0, )" },
            { "name": "Lib", "target": "project" }
          ]
        }
      ]
    },
    {
      "unique_name": "/repo/Lib/Lib.csproj",
      "name": "Lib",
      "base_directory": "/repo/Lib",
      "frameworks": [
        {
          "framework": "net6.0",
          "dependencies": [{ "name": "PackageB", "range": "[2.0.0, )" }]
        }
      ]
    }
  ]
}"#;

const APP_LOCK: &str = r#"{
  "version": 1,
  "dependencies": {
    "net6.0": {
      "PackageA": {
        "type": "Direct",
        "requested": "[1.0.0, )",
        "resolved": "1.0.0",
        "sha512": "aaaa=="
      },
      "PackageB": {
        "type": "Transitive",
        "resolved": "2.0.0",
        "sha512": "bbbb=="
      },
      "Lib": {
        "type": "Project",
        "dependencies": {
          "PackageB": "[2.0.0, )"
        }
      }
    }
  }
}"#;

fn snapshot(json: &str) -> DependencyGraphSpec {
    parse_dgspec_str(json).expect("dgspec should parse")
}

fn lock(json: &str) -> ParsedLockFile {
    let logger = RecordingLogger::default();
    let parsed = parse_str(json, "/repo/App/packages.lock.json", &logger);
    assert!(!parsed.is_corrupt(), "fixture lock file should parse");
    parsed
}

fn validate(dgspec: &str, lock_json: &str) -> LockValidation {
    LockValidator::new(IdComparer::ORDINAL)
        .validate(&snapshot(dgspec), &lock(lock_json))
        .unwrap()
}

fn stale(dgspec: &str, lock_json: &str) -> StaleReason {
    match validate(dgspec, lock_json) {
        LockValidation::Stale(reason) => reason,
        LockValidation::Valid => panic!("expected a stale lock file"),
    }
}

#[test]
fn unchanged_lock_file_is_valid() {
    let verdict = validate(APP_DGSPEC, APP_LOCK);
    assert_eq!(verdict, LockValidation::Valid);
    assert!(LockValidator::new(IdComparer::ORDINAL)
        .is_valid(&snapshot(APP_DGSPEC), &lock(APP_LOCK))
        .unwrap());
}

#[test]
fn exact_lock_request_differs_from_open_declared_range() {
    let lock_json = APP_LOCK.replace(
        r#""requested": "[1.0.0, )""#,
        r#""requested": "[1.0.0]""#,
    );
    match stale(APP_DGSPEC, &lock_json) {
        StaleReason::DirectDependencyChanged {
            framework,
            id,
            declared,
            locked,
        } => {
            assert_eq!(framework, "net6.0");
            assert_eq!(id, "PackageA");
            assert_eq!(declared, "[1.0.0, )");
            assert_eq!(locked.as_deref(), Some("[1.0.0]"));
        }
        other => panic!("unexpected reason {other:?}"),
    }
}

#[test]
fn equivalent_range_spellings_are_equal() {
    let lock_json = APP_LOCK.replace(r#""requested": "[1.0.0, )""#, r#""requested": "1.0""#);
    assert!(validate(APP_DGSPEC, &lock_json).is_valid());
}

#[test]
fn new_direct_dependency_is_missing() {
    let dgspec = APP_DGSPEC.replace(
        r#"{ "name": "Lib", "target": "project" }"#,
        r#"{ "name": "Lib", "target": "project" }, { "name": "PackageC", "range": "3.0.0" }"#,
    );
    assert_eq!(
        stale(&dgspec, APP_LOCK),
        StaleReason::DirectDependencyMissing {
            framework: "net6.0".to_owned(),
            id: "PackageC".to_owned(),
        }
    );
}

#[test]
fn transitive_entry_does_not_satisfy_direct_request() {
    let dgspec = APP_DGSPEC.replace(
        r#"{ "name": "Lib", "target": "project" }"#,
        r#"{ "name": "Lib", "target": "project" }, { "name": "PackageB", "range": "[2.0.0, )" }"#,
    );
    assert!(matches!(
        stale(&dgspec, APP_LOCK),
        StaleReason::DirectDependencyMissing { id, .. } if id == "PackageB"
    ));
}

#[test]
fn framework_missing_from_lock_does_not_invalidate_by_itself() {
    let dgspec = APP_DGSPEC.replacen(
        r#""frameworks": ["#,
        r#""frameworks": [
        { "framework": "net7.0", "dependencies": [{ "name": "PackageZ", "range": "9.0.0" }] },"#,
        1,
    );
    assert!(validate(&dgspec, APP_LOCK).is_valid());
}

#[test]
fn framework_missing_from_lock_still_checks_project_references() {
    let dgspec = APP_DGSPEC.replacen(
        r#""frameworks": ["#,
        r#""frameworks": [
        { "framework": "net7.0", "dependencies": [] },"#,
        1,
    );
    let lock_json = APP_LOCK.replace(r#""PackageB": "[2.0.0, )""#, r#""PackageB": "[1.5.0, )""#);
    assert!(matches!(
        stale(&dgspec, &lock_json),
        StaleReason::ProjectDependencyChanged { .. }
    ));
}

#[test]
fn missing_project_entry_is_stale() {
    let lock_json = APP_LOCK.replace(r#""type": "Project""#, r#""type": "Transitive""#);
    assert_eq!(
        stale(APP_DGSPEC, &lock_json),
        StaleReason::ProjectReferenceMissing {
            framework: "net6.0".to_owned(),
            project: "Lib".to_owned(),
        }
    );
}

#[test]
fn changed_project_dependency_is_stale() {
    let dgspec = APP_DGSPEC.replace(
        r#"{ "name": "PackageB", "range": "[2.0.0, )" }"#,
        r#"{ "name": "PackageB", "range": "[2.1.0, )" }"#,
    );
    assert_eq!(
        stale(&dgspec, APP_LOCK),
        StaleReason::ProjectDependencyChanged {
            framework: "net6.0".to_owned(),
            project: "Lib".to_owned(),
            id: "PackageB".to_owned(),
            declared: "[2.1.0, )".to_owned(),
            locked: "[2.0.0, )".to_owned(),
        }
    );
}

#[test]
fn new_project_dependency_is_missing() {
    let dgspec = APP_DGSPEC.replace(
        r#"[{ "name": "PackageB", "range": "[2.0.0, )" }]"#,
        r#"[{ "name": "PackageB", "range": "[2.0.0, )" }, { "name": "PackageD" }]"#,
    );
    assert!(matches!(
        stale(&dgspec, APP_LOCK),
        StaleReason::ProjectDependencyMissing { id, .. } if id == "PackageD"
    ));
}

#[test]
fn indirectly_referenced_projects_are_checked() {
    let dgspec = APP_DGSPEC
        .replace(
            r#""name": "Lib",
      "base_directory": "/repo/Lib","#,
            r#""name": "Lib",
      "base_directory": "/repo/Lib",
      "project_references": ["/repo/Core/Core.csproj"],"#,
        )
        .replacen(
            r#"  ]
}"#,
            r#"  ,
    {
      "unique_name": "/repo/Core/Core.csproj",
      "name": "Core",
      "frameworks": [{ "framework": "net6.0", "dependencies": [] }]
    }
  ]
}"#,
            1,
        );
    let spec = snapshot(&dgspec);
    assert_eq!(spec.projects().len(), 3);

    assert_eq!(
        stale(&dgspec, APP_LOCK),
        StaleReason::ProjectReferenceMissing {
            framework: "net6.0".to_owned(),
            project: "Core".to_owned(),
        }
    );

    let lock_json = APP_LOCK.replace(
        r#"      "Lib": {"#,
        r#"      "Core": {
        "type": "Project"
      },
      "Lib": {"#,
    );
    assert!(validate(&dgspec, &lock_json).is_valid());
}

#[test]
fn every_other_snapshot_project_is_checked() {
    let dgspec = APP_DGSPEC.replace(r#""project_references": ["/repo/Lib/Lib.csproj"],"#, "");
    let lock_json = r#"{"version": 1, "dependencies": {"net6.0": {}}}"#;
    assert_eq!(
        stale(&dgspec, lock_json),
        StaleReason::DirectDependencyMissing {
            framework: "net6.0".to_owned(),
            id: "PackageA".to_owned(),
        }
    );

    let dgspec = dgspec.replace(
        r#"{ "name": "PackageA", "range": "[1.0.0, )" },"#,
        "",
    );
    assert_eq!(
        stale(&dgspec, lock_json),
        StaleReason::ProjectReferenceMissing {
            framework: "net6.0".to_owned(),
            project: "Lib".to_owned(),
        }
    );

    let lock_json = APP_LOCK.replace(r#""type": "Project""#, r#""type": "Transitive""#);
    assert!(matches!(
        stale(APP_DGSPEC, &lock_json),
        StaleReason::ProjectReferenceMissing { project, .. } if project == "Lib"
    ));
}

#[test]
fn runtime_specific_targets_are_not_consulted() {
    let lock_json = APP_LOCK.replace(
        "\n  }\n}",
        r#",
    "net6.0/win-x64": {
      "PackageA": {
        "type": "Direct",
        "requested": "[0.5.0]",
        "resolved": "0.5.0"
      }
    }
  }
}"#,
    );
    let parsed = lock(&lock_json);
    assert_eq!(parsed.lock_file().unwrap().targets().len(), 2);
    assert!(validate(APP_DGSPEC, &lock_json).is_valid());
}

#[test]
fn corrupt_lock_file_is_always_stale() {
    let logger = RecordingLogger::default();
    let parsed = parse_str("{ \"version\": ", "/repo/App/packages.lock.json", &logger);
    assert_eq!(logger.warnings.borrow().len(), 1);

    let verdict = LockValidator::new(IdComparer::ORDINAL)
        .validate(&snapshot(APP_DGSPEC), &parsed)
        .unwrap();
    assert!(matches!(
        verdict,
        LockValidation::Stale(StaleReason::Corrupt { .. })
    ));
}

#[test]
fn other_format_versions_are_stale() {
    let lock_json = APP_LOCK.replace(r#""version": 1"#, r#""version": 2"#);
    assert_eq!(
        stale(APP_DGSPEC, &lock_json),
        StaleReason::UnsupportedVersion { found: Some(2) }
    );
}

#[test]
fn lock_file_without_version_is_stale() {
    let lock_json = APP_LOCK.replace("  \"version\": 1,\n", "");
    let parsed = lock(&lock_json);
    assert_eq!(parsed.lock_file().unwrap().targets().len(), 1);
    let reason = stale(APP_DGSPEC, &lock_json);
    assert_eq!(reason, StaleReason::UnsupportedVersion { found: None });
    assert_eq!(reason.to_string(), "lock file has no format version");
}

#[test]
fn comparer_decides_id_and_path_matching() {
    let dgspec = APP_DGSPEC
        .replace(r#""name": "PackageA""#, r#""name": "packagea""#)
        .replace(
            r#""restore": ["/repo/App/App.csproj"]"#,
            r#""restore": ["/REPO/app/App.csproj"]"#,
        );
    let spec = snapshot(&dgspec);
    let parsed = lock(APP_LOCK);

    assert!(matches!(
        LockValidator::new(IdComparer::ORDINAL).validate(&spec, &parsed),
        Err(CoreError::ProjectNotFound(_))
    ));
    assert!(LockValidator::new(IdComparer::IGNORE_CASE)
        .validate(&spec, &parsed)
        .unwrap()
        .is_valid());
}

#[test]
fn empty_restore_list_is_an_error() {
    let dgspec = APP_DGSPEC.replace(r#""restore": ["/repo/App/App.csproj"]"#, r#""restore": []"#);
    assert!(matches!(
        LockValidator::new(IdComparer::ORDINAL).validate(&snapshot(&dgspec), &lock(APP_LOCK)),
        Err(CoreError::NoRestoreProject)
    ));
}

#[test]
fn any_project_can_be_validated_explicitly() {
    let lib_lock = r#"{"version": 1, "dependencies": {"net6.0": {
        "PackageB": {"type": "Direct", "requested": "[2.0.0, )", "resolved": "2.0.0"},
        "App": {"type": "Project", "dependencies": {"PackageA": "[1.0.0, )"}}
    }}}"#;
    let validator = LockValidator::new(IdComparer::ORDINAL);
    let verdict = validator
        .validate_project(&snapshot(APP_DGSPEC), "/repo/Lib/Lib.csproj", &lock(lib_lock))
        .unwrap();
    assert!(verdict.is_valid());

    let without_app = lib_lock.replace(r#""App": {"type": "Project""#, r#""App": {"type": "Transitive""#);
    assert!(matches!(
        validator
            .validate_project(&snapshot(APP_DGSPEC), "/repo/Lib/Lib.csproj", &lock(&without_app))
            .unwrap()
            .stale_reason(),
        Some(StaleReason::ProjectReferenceMissing { project, .. }) if project == "App"
    ));
}

#[test]
fn files_on_disk_round_trip_through_store_and_validator() {
    let dir = tempfile::tempdir().unwrap();
    let dgspec_path = dir.path().join("app.dgspec.json");
    let base = dir.path().join("App");
    let dgspec = APP_DGSPEC.replace("/repo/App\"", &format!("{}\"", base.display()));
    std::fs::write(&dgspec_path, dgspec).unwrap();

    let spec = JsonSnapshotFile::new(&dgspec_path).load().unwrap();
    let store = LockFileStore::host();
    let project = &spec.projects()[0];
    let lock_path = store.lock_file_path(project).unwrap();
    assert_eq!(lock_path, base.join("packages.lock.json"));
    assert!(!store.is_lock_file_supported(project));

    let original = lock(APP_LOCK).into_lock_file().unwrap();
    store.write(&lock_path, &original).unwrap();
    assert!(store.is_lock_file_supported(project));

    let logger = RecordingLogger::default();
    let reread = store.read(&lock_path, &logger).unwrap();
    assert!(logger.warnings.borrow().is_empty());
    assert_eq!(reread.lock_file(), Some(&original));
    assert_eq!(
        reread.lock_file().unwrap().fingerprint(),
        original.fingerprint()
    );

    let verdict = LockValidator::new(IdComparer::ORDINAL)
        .validate(&spec, &reread)
        .unwrap();
    assert!(verdict.is_valid());
}
