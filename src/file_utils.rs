/*!
 * File and directory utilities.
 */

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;

/// File operations utility
pub struct FileManager;

impl FileManager {
    /// Check that `path` is an existing file
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Check that `path` is an existing directory
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    /// Output path for a converted subtitle (same stem, .ass)
    pub fn subtitle_output_path<P: AsRef<Path>>(input_file: P) -> PathBuf {
        input_file.as_ref().with_extension("ass")
    }

    /// Fail when `output` exists and overwriting was not requested
    pub fn check_overwrite<P: AsRef<Path>>(output: P, force_overwrite: bool) -> Result<(), AppError> {
        let output = output.as_ref();
        if output.exists() && !force_overwrite {
            return Err(AppError::OutputExists(output.to_path_buf()));
        }
        Ok(())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut result = Vec::new();
        let wanted = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }
}
