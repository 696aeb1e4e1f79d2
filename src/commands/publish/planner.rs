use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::core::Job;

/// Directories that derive the same repository name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameCollision {
    pub repo_name: String,
    pub paths: Vec<PathBuf>,
}

pub struct JobPlan {
    pub jobs: Vec<Job>,
    /// Repeated paths that were dropped, in input order
    pub duplicate_paths: Vec<PathBuf>,
    /// Sorted by repository name
    pub name_collisions: Vec<NameCollision>,
}

/// Turns enumerated directories into jobs
///
/// A path listed twice is only published once. Distinct paths that map to
/// the same repository name are all kept and reported as collisions.
pub fn plan_jobs(dirs: Vec<PathBuf>) -> JobPlan {
    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(dirs.len());
    let mut duplicate_paths = Vec::new();

    for dir in dirs {
        // `components()` drops `.` segments and trailing separators
        let key: PathBuf = dir.components().collect();
        if !seen.insert(key) {
            duplicate_paths.push(dir);
            continue;
        }
        jobs.push(Job::new(dir));
    }

    let mut by_name: HashMap<&str, Vec<PathBuf>> = HashMap::new();
    for job in &jobs {
        by_name
            .entry(job.repo_name.as_str())
            .or_default()
            .push(job.path.clone());
    }

    let mut name_collisions: Vec<NameCollision> = by_name
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(name, paths)| NameCollision {
            repo_name: name.to_string(),
            paths,
        })
        .collect();
    name_collisions.sort_by(|a, b| a.repo_name.cmp(&b.repo_name));

    JobPlan {
        jobs,
        duplicate_paths,
        name_collisions,
    }
}
