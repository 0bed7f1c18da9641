/*!
 * Error types for the utoolkit application.
 *
 * This module contains custom error types for the subtitle, cover and
 * configuration parts of the application, using the thiserror crate for
 * ergonomic error definitions. None of these types log anything on
 * construction: callers decide how a failure is reported.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The file could not be read
    #[error("{} is not a valid file: {source}", path.display())]
    Io {
        /// Path of the unreadable file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid UTF-8
    #[error("Decode error in {}", path.display())]
    Decode {
        /// Path of the badly encoded file
        path: PathBuf,
    },

    /// The subtitle format could not be recognized
    #[error("Unrecognized subtitle format: {}", path.display())]
    UnknownFormat {
        /// Path of the file
        path: PathBuf,
    },

    /// The output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while processing a cover image
#[derive(Error, Debug)]
pub enum CoverError {
    /// The input could not be opened or decoded as an image
    #[error("{} is not a valid image file", path.display())]
    InvalidImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The requested output extension does not name a known image format
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Encoding or writing the output failed
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors that can occur while loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the config schema
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The output exists and overwriting was not requested
    #[error("{} already exists", .0.display())]
    OutputExists(PathBuf),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from cover processing
    #[error("Cover error: {0}")]
    Cover(#[from] CoverError),

    /// Error from configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error while scanning an input directory
    #[error("Failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid combination of inputs
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some files of a folder run failed
    #[error("{failed} of {total} files failed")]
    Partial {
        /// Number of failed files
        failed: usize,
        /// Number of files attempted
        total: usize,
    },
}
