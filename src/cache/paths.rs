// Cache path utilities.
// Platform directories for the repository snapshot and preview logs.

use std::path::PathBuf;

use directories::ProjectDirs;

/// File name of the repository snapshot. Versioned so a format change can move to a new file.
pub const SNAPSHOT_FILE: &str = "gh_repos_cache_v1.json";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "repofolio")
}

/// Get the base cache directory (~/.cache/repofolio on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the repository snapshot.
pub fn snapshot_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(SNAPSHOT_FILE))
}

/// Directory for preview session logs.
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("logs"))
}
