use criterion::{criterion_group, criterion_main, Criterion};
use gitfleet::commands::publish::plan_jobs;
use gitfleet::core::{repo_name_for_path, scan_directories};
use std::fs;
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_tree(projects: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for i in 0..projects {
        let project = root.join(format!("Project {i}"));
        fs::create_dir_all(project.join("src/module")).unwrap();
        fs::create_dir_all(project.join(".git/objects/pack")).unwrap();
    }

    temp_dir
}

fn bench_scan(c: &mut Criterion) {
    let temp_dir = setup_tree(100);
    let path = temp_dir.path().to_path_buf();

    c.bench_function("scan_100_projects", |b| {
        b.iter(|| scan_directories(black_box(&path), 20))
    });
}

fn bench_naming(c: &mut Criterion) {
    let paths: Vec<PathBuf> = (0..1000)
        .map(|i| PathBuf::from(format!("/data/Client Work/Site Redesign #{i} (Final)")))
        .collect();

    c.bench_function("repo_names_1000", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(repo_name_for_path(path));
            }
        })
    });

    c.bench_function("plan_1000_jobs", |b| {
        b.iter(|| plan_jobs(black_box(paths.clone())))
    });
}

criterion_group!(benches, bench_scan, bench_naming);
criterion_main!(benches);
