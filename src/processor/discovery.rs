//! File discovery for AQUARIUS export directories
//!
//! Lists the export files matching the configured pattern and returns them
//! in sorted path order, which fixes the merge order of a run.

use crate::error::{AquariusError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File discovery component for AQUARIUS export directories
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    file_pattern: String,
    recursive: bool,
    excluded: Vec<PathBuf>,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_dir: PathBuf, file_pattern: impl Into<String>) -> Self {
        Self {
            input_dir,
            file_pattern: file_pattern.into(),
            recursive: false,
            excluded: Vec::new(),
        }
    }

    /// Also search subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Never return `path`, e.g. an output file written into the input directory
    pub fn exclude(mut self, path: PathBuf) -> Self {
        self.excluded.push(path);
        self
    }

    /// Discover export files, sorted by path
    pub async fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let is_dir = fs::metadata(&self.input_dir)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(AquariusError::InputDirectoryNotFound {
                path: self.input_dir.clone(),
            });
        }

        let pattern = self.search_pattern();
        debug!("Searching for export files matching: {}", pattern);

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if path.is_file() && !self.is_excluded(&path) {
                files.push(path);
            }
        }
        files.sort();

        debug!(
            "Found {} export files in {}",
            files.len(),
            self.input_dir.display()
        );

        Ok(files)
    }

    fn search_pattern(&self) -> String {
        let base = Pattern::escape(&self.input_dir.to_string_lossy());
        let base = Path::new(&base);

        let pattern = if self.recursive {
            base.join("**").join(&self.file_pattern)
        } else {
            base.join(&self.file_pattern)
        };

        pattern.to_string_lossy().into_owned()
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|excluded| {
            excluded == path
                || matches!(
                    (excluded.canonicalize(), path.canonicalize()),
                    (Ok(a), Ok(b)) if a == b
                )
        })
    }
}
