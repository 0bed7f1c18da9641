/*!
 * Application controller for cover and subtitle processing.
 */

use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::caption_merger::{self, MergeReport};
use crate::cover::{Cover, CoverOptions};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleFile;

/// Outcome of a folder conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    /// Files converted
    pub converted: usize,

    /// Files skipped because their output already existed
    pub skipped: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resize a cover image and save it
    ///
    /// `options` and `output` fall back to the configured defaults.
    pub fn run_cover(
        &self,
        input_file: &Path,
        output: Option<&Path>,
        options: Option<CoverOptions>,
        force_overwrite: bool,
    ) -> Result<PathBuf, AppError> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.cover.output));
        FileManager::check_overwrite(&output, force_overwrite)?;

        let options = options.unwrap_or_else(|| self.config.cover.options.clone());
        if options.width == 0 || options.height == 0 {
            return Err(AppError::InvalidInput(format!(
                "cover size must be positive, got {}x{}",
                options.width, options.height
            )));
        }
        debug!("Cover options: {:?}", options);

        Cover::new(options).process(input_file, &output)?;
        info!("Success: {:?}", output);

        Ok(output)
    }

    /// Convert a subtitle file, or every VTT file below a directory, to ASS
    pub fn run_subtitles(
        &self,
        input_path: &Path,
        output: Option<&Path>,
        min_duration_ms: Option<i64>,
        force_overwrite: bool,
    ) -> Result<FolderSummary, AppError> {
        let min_duration_ms = min_duration_ms.unwrap_or(self.config.subtitle.min_duration_ms);

        if FileManager::dir_exists(input_path) {
            if output.is_some() {
                return Err(AppError::InvalidInput(
                    "--output cannot be used with a directory input".to_string(),
                ));
            }
            return self.run_subtitle_folder(input_path, min_duration_ms, force_overwrite);
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::subtitle_output_path(input_path));
        self.convert_subtitle(input_path, &output, min_duration_ms, force_overwrite)?;

        Ok(FolderSummary { converted: 1, skipped: 0 })
    }

    /// Clean up one subtitle file and write it as ASS
    ///
    /// The overwrite check happens before the input is read, and the output
    /// is only written once the whole pipeline has succeeded.
    pub fn convert_subtitle(
        &self,
        input_file: &Path,
        output_file: &Path,
        min_duration_ms: i64,
        force_overwrite: bool,
    ) -> Result<MergeReport, AppError> {
        FileManager::check_overwrite(output_file, force_overwrite)?;

        let subtitles = SubtitleFile::load(input_file)?;
        debug!("{}", subtitles);

        let (events, report) = caption_merger::process_events(subtitles.events, min_duration_ms);
        info!(
            "{:?}: {} events in, {} after merging, {} too short, {} written",
            input_file, report.input_events, report.merged_events, report.removed_short, report.output_events
        );

        SubtitleFile::save_ass(&events, output_file)?;
        info!("Success: {:?}", output_file);

        Ok(report)
    }

    // @processes: Every .vtt file below `input_dir`, next to its source
    fn run_subtitle_folder(
        &self,
        input_dir: &Path,
        min_duration_ms: i64,
        force_overwrite: bool,
    ) -> Result<FolderSummary, AppError> {
        let files = FileManager::find_files(input_dir, "vtt")?;
        if files.is_empty() {
            warn!("No VTT files found in directory: {:?}", input_dir);
            return Ok(FolderSummary::default());
        }

        info!("Converting {} subtitle files in {:?}", files.len(), input_dir);

        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();
        let mut failed = 0;

        for file in &files {
            folder_pb.set_message(file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
            let output = FileManager::subtitle_output_path(file);

            match self.convert_subtitle(file, &output, min_duration_ms, force_overwrite) {
                Ok(_) => summary.converted += 1,
                Err(AppError::OutputExists(path)) => {
                    warn!("Skipping {:?}, {:?} already exists (use -f to force overwrite)", file, path);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing {:?}: {}", file, e);
                    failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Finished: {} converted, {} skipped, {} failed",
            summary.converted, summary.skipped, failed
        );

        if failed > 0 {
            return Err(AppError::Partial { failed, total: files.len() });
        }

        Ok(summary)
    }
}
