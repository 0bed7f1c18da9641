/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use utoolkit::errors::{AppError, CoverError, SubtitleError};

#[test]
fn test_appError_outputExists_shouldNamePath() {
    let error = AppError::OutputExists(PathBuf::from("video.ass"));
    assert_eq!(format!("{}", error), "video.ass already exists");
}

#[test]
fn test_subtitleError_decode_shouldDisplayCorrectly() {
    let error = SubtitleError::Decode { path: PathBuf::from("bad.vtt") };
    assert_eq!(format!("{}", error), "Decode error in bad.vtt");
}

#[test]
fn test_appError_fromSubtitleError_shouldWrapCorrectly() {
    let subtitle_error = SubtitleError::UnknownFormat { path: PathBuf::from("x.bin") };
    let app_error: AppError = subtitle_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Subtitle error"));
    assert!(display.contains("x.bin"));
}

#[test]
fn test_appError_fromCoverError_shouldWrapCorrectly() {
    let app_error: AppError = CoverError::UnsupportedFormat("xyz".to_string()).into();
    assert!(matches!(app_error, AppError::Cover(_)));
    assert!(format!("{}", app_error).contains("xyz"));
}

#[test]
fn test_appError_partial_shouldDisplayCounts() {
    let error = AppError::Partial { failed: 2, total: 5 };
    assert_eq!(format!("{}", error), "2 of 5 files failed");
}
