/*!
 * # utoolkit - toolkit for processing YouTube files
 *
 * A Rust library and command-line tool for preparing video uploads.
 *
 * ## Features
 *
 * - Resize cover images to a reference size, covering or fitting it, with
 *   optional black padding
 * - Convert auto-generated VTT subtitles to ASS:
 *   - Unescape `&amp;`
 *   - Merge the repeated sliding-window captions of live transcripts
 *   - Drop events too short to read
 * - Read WebVTT, SubRip and ASS input
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `caption_merger`: Duplicate caption merging and event filtering
 * - `subtitle_processor`: Subtitle decoding and ASS output
 * - `cover`: Cover image resizing
 * - `app_controller`: Runs the cover and subtitle workflows
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod caption_merger;
pub mod cover;
pub mod errors;
pub mod file_utils;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use caption_merger::{merge_duplicates, process_events, MergeReport, NormalizedText};
pub use subtitle_processor::{CaptionEvent, SubtitleFile, SubtitleFormat};
pub use errors::{AppError, ConfigError, CoverError, SubtitleError};
