use criterion::{criterion_group, criterion_main, Criterion};
use pkglock_core::{IdComparer, LockValidator};
use pkglock_schema::{
    parse_dgspec_str, parse_str, render, DependencyGraphSpec, InstallationType, LockFile,
    LockFileDependency, LockFileTarget, NullLogger, PackageDependency, PackageVersion,
    ParsedLockFile, TargetFramework, VersionRange,
};
use std::fmt::Write;

const FRAMEWORKS: [&str; 3] = ["net6.0", "net7.0", "net8.0"];

fn synthetic_lock(packages: usize) -> LockFile {
    let targets = FRAMEWORKS
        .iter()
        .map(|fw| {
            let deps = (0..packages)
                .map(|i| {
                    let version = PackageVersion::new(1, 0, i as u64);
                    let kind = if i % 4 == 0 {
                        InstallationType::Direct
                    } else {
                        InstallationType::Transitive
                    };
                    let mut dep = LockFileDependency::new(format!("Package{i:04}"), kind)
                        .with_resolved(version.clone())
                        .with_content_hash(format!("{i:064x}"))
                        .with_dependencies(vec![PackageDependency::new(
                            format!("Package{:04}", (i + 1) % packages),
                            VersionRange::at_least(version.clone()),
                        )]);
                    if kind == InstallationType::Direct {
                        dep = dep.with_requested(VersionRange::at_least(version));
                    }
                    dep
                })
                .collect();
            LockFileTarget::new(TargetFramework::parse(fw), None, deps)
        })
        .collect();
    LockFile::new(1, targets)
}

fn synthetic_dgspec(packages: usize) -> DependencyGraphSpec {
    let mut deps = String::new();
    for i in (0..packages).step_by(4) {
        if !deps.is_empty() {
            deps.push(',');
        }
        let _ = write!(deps, r#"{{"name": "Package{i:04}", "range": "[1.0.{i}, )"}}"#);
    }
    let frameworks: Vec<String> = FRAMEWORKS
        .iter()
        .map(|fw| format!(r#"{{"framework": "{fw}", "dependencies": [{deps}]}}"#))
        .collect();
    let json = format!(
        r#"{{"restore": ["/bench/App.csproj"], "projects": [{{"unique_name": "/bench/App.csproj", "name": "App", "frameworks": [{}]}}]}}"#,
        frameworks.join(",")
    );
    parse_dgspec_str(&json).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let rendered = render(&synthetic_lock(500)).unwrap();
    c.bench_function("lock_parse_500pkg_3fw", |b| {
        b.iter(|| parse_str(&rendered, "/bench/packages.lock.json", &NullLogger));
    });
}

fn bench_render(c: &mut Criterion) {
    let lock = synthetic_lock(500);
    c.bench_function("lock_render_500pkg_3fw", |b| {
        b.iter(|| render(&lock).unwrap());
    });
}

fn bench_validate(c: &mut Criterion) {
    let spec = synthetic_dgspec(500);
    let lock = ParsedLockFile::Loaded(synthetic_lock(500));
    let validator = LockValidator::new(IdComparer::IGNORE_CASE);
    c.bench_function("lock_validate_500pkg_3fw", |b| {
        b.iter(|| assert!(validator.validate(&spec, &lock).unwrap().is_valid()));
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    c.bench_function("lock_fingerprint_500pkg_3fw", |b| {
        b.iter_with_setup(|| synthetic_lock(500), |lock| lock.fingerprint());
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_render,
    bench_validate,
    bench_fingerprint,
);
criterion_main!(benches);
