//! Best-effort removal of bundles and Terraform's local state.
//!
//! Nothing here fails the run: every problem is logged and collected into a
//! [`CleanupReport`]. Paths that are already gone are skipped silently, so
//! running cleanup twice is harmless.

use crate::artifact::{BUNDLE_FILES, instance_dir};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Files Terraform leaves in the module directory
pub const TERRAFORM_STATE_FILES: [&str; 4] = [
    ".terraform.lock.hcl",
    "terraform.tfstate",
    "terraform.tfstate.backup",
    "terraform.tfvars",
];

/// Provider/plugin cache directory inside the module directory
pub const TERRAFORM_CACHE_DIR: &str = ".terraform";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.removed.extend(other.removed);
        self.failures.extend(other.failures);
    }

    fn remove_file(&mut self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => self.removed.push(path.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => self.fail(path, e),
        }
    }

    fn remove_dir(&mut self, path: &Path) {
        match fs::remove_dir_all(path) {
            Ok(()) => self.removed.push(path.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => self.fail(path, e),
        }
    }

    fn fail(&mut self, path: &Path, error: std::io::Error) {
        tracing::warn!("Failed to remove {}: {}", path.display(), error);
        self.failures.push(CleanupFailure {
            path: path.to_path_buf(),
            message: error.to_string(),
        });
    }
}

/// Remove the bundle of instance `index`: its five files, then the directory itself
pub fn cleanup_instance(output_dir: &Path, index: u32) -> CleanupReport {
    let dir = instance_dir(output_dir, index);
    let mut report = CleanupReport::new();
    for name in BUNDLE_FILES {
        report.remove_file(&dir.join(name));
    }
    report.remove_dir(&dir);
    report
}

/// Remove the bundles of instances `1..=count`
pub fn cleanup_instances(output_dir: &Path, count: u32) -> CleanupReport {
    let mut report = CleanupReport::new();
    for index in 1..=count {
        report.merge(cleanup_instance(output_dir, index));
    }
    report
}

/// Remove lock file, state, state backup, variables file and plugin cache from a module directory
pub fn cleanup_terraform_state(module_dir: &Path) -> CleanupReport {
    let mut report = CleanupReport::new();
    for name in TERRAFORM_STATE_FILES {
        report.remove_file(&module_dir.join(name));
    }
    report.remove_dir(&module_dir.join(TERRAFORM_CACHE_DIR));
    report
}
