//! Profile loader: collects device profiles from search directories.

use std::path::{Path, PathBuf};

use super::DeviceProfile;
use crate::error::Result;

/// Loads every profile file found in its search paths.
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileLoader {
    /// Create a loader with the default search path (`profiles/`).
    pub fn new() -> Self {
        Self {
            search_paths: vec![PathBuf::from("profiles/")],
        }
    }

    /// Create a loader searching a single directory.
    pub fn with_search_path(path: impl Into<PathBuf>) -> Self {
        Self {
            search_paths: vec![path.into()],
        }
    }

    /// Append a directory to search.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Directories searched, in order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn is_profile_file(path: &Path) -> bool {
        path.extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml" || ext == "json")
    }

    /// Load all profiles from all search paths, sorted by file name within
    /// each directory. Files that fail to parse are logged and skipped;
    /// missing directories are ignored.
    pub fn load_all(&self) -> Result<Vec<(PathBuf, DeviceProfile)>> {
        let mut profiles = Vec::new();

        for search_path in &self.search_paths {
            if !search_path.exists() {
                continue;
            }
            let mut paths = Vec::new();
            for entry in std::fs::read_dir(search_path)? {
                let path = entry?.path();
                if path.is_file() && Self::is_profile_file(&path) {
                    paths.push(path);
                }
            }
            paths.sort();

            for path in paths {
                match DeviceProfile::from_file(&path) {
                    Ok(profile) => profiles.push((path, profile)),
                    Err(e) => {
                        log::warn!("Skipping profile {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(profiles)
    }
}
