/*!
 * End-to-end tests for the subtitle conversion workflow
 */

use std::fs;
use anyhow::Result;
use utoolkit::app_config::Config;
use utoolkit::app_controller::{Controller, FolderSummary};
use utoolkit::errors::AppError;
use utoolkit::subtitle_processor::{SubtitleFile, SubtitleFormat};
use crate::common;

fn controller() -> Controller {
    Controller::with_config(Config::default())
}

/// Test the full pipeline on auto-generated captions
#[test]
fn test_convert_autoCaptions_shouldMergeWindowsIntoAss() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_auto_captions(temp_dir.path(), "talk.en.vtt")?;
    let output = temp_dir.path().join("talk.en.ass");

    let report = controller().convert_subtitle(&input, &output, 100, false)?;

    assert_eq!(report.input_events, 5);
    assert_eq!(report.merged_events, 2);
    assert_eq!(report.output_events, 2);

    let written = SubtitleFile::load(&output)?;
    assert_eq!(written.format, SubtitleFormat::Ass);
    assert_eq!(written.events.len(), 2);

    // The first run ends where its two-line cue began
    assert_eq!(written.events[0].text, "welcome back everyone");
    assert_eq!((written.events[0].start_ms, written.events[0].end_ms), (0, 2350));

    // The trailing run is emitted as its first cue, so the last line is lost
    assert_eq!(written.events[1].text, "today we talk about rust");
    assert_eq!((written.events[1].start_ms, written.events[1].end_ms), (2350, 5130));

    Ok(())
}

/// Test that cue markup never leaves padding spaces in the written dialogue
#[test]
fn test_convert_cueTaggedCaption_shouldWriteTrimmedDialogue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "tagged.vtt",
        "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\n<c>hello</c>\n\n00:00:01.000 --> 00:00:02.000\nhello world\n\n00:00:02.000 --> 00:00:03.000\ngoodbye\n",
    )?;
    let output = temp_dir.path().join("tagged.ass");

    controller().convert_subtitle(&input, &output, 100, false)?;

    let written = fs::read_to_string(&output)?;
    assert!(written.contains("Dialogue: 0,0:00:00.00,0:00:02.00,Default,,0,0,0,,hello\n"));
    assert!(written.contains("Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,goodbye\n"));
    Ok(())
}

/// Test that the default output path swaps the extension for .ass
#[test]
fn test_runSubtitles_withoutOutput_shouldWriteNextToInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_auto_captions(temp_dir.path(), "clip.vtt")?;

    let summary = controller().run_subtitles(&input, None, None, false)?;

    assert_eq!(summary, FolderSummary { converted: 1, skipped: 0 });
    assert!(temp_dir.path().join("clip.ass").exists());
    Ok(())
}

/// Test that an existing output is never touched without force
#[test]
fn test_runSubtitles_existingOutput_shouldFailWithoutForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_auto_captions(temp_dir.path(), "clip.vtt")?;
    let output = common::create_test_file(temp_dir.path(), "clip.ass", "keep me")?;

    let result = controller().run_subtitles(&input, None, None, false);

    assert!(matches!(result, Err(AppError::OutputExists(_))));
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    controller().run_subtitles(&input, None, None, true)?;
    assert!(fs::read_to_string(&output)?.starts_with("[Script Info]"));
    Ok(())
}

/// Test that the overwrite check runs before the input is decoded
#[test]
fn test_runSubtitles_existingOutputAndBadInput_shouldReportOutputExists() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "garbage.txt", "not subtitles")?;
    let output = common::create_test_file(temp_dir.path(), "out.ass", "")?;

    let result = controller().run_subtitles(&input, Some(output.as_path()), None, false);

    assert!(matches!(result, Err(AppError::OutputExists(_))));
    Ok(())
}

/// Test that a decode failure writes nothing
#[test]
fn test_runSubtitles_unknownFormat_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "garbage.txt", "not subtitles")?;
    let output = temp_dir.path().join("out.ass");

    let result = controller().run_subtitles(&input, Some(output.as_path()), None, false);

    assert!(matches!(result, Err(AppError::Subtitle(_))));
    assert!(!output.exists());
    Ok(())
}

/// Test the minimum duration override and the config default
#[test]
fn test_runSubtitles_durationThreshold_shouldFilterShortEvents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "short.srt",
        "1\n00:00:00,000 --> 00:00:00,050\nflash\n\n2\n00:00:01,000 --> 00:00:01,300\nthree hundred\n",
    )?;
    let output = temp_dir.path().join("short.ass");

    controller().run_subtitles(&input, None, None, false)?;
    assert_eq!(SubtitleFile::load(&output)?.events.len(), 1);

    controller().run_subtitles(&input, None, Some(500), true)?;
    assert!(SubtitleFile::load(&output)?.events.is_empty());

    let mut config = Config::default();
    config.subtitle.min_duration_ms = 0;
    Controller::with_config(config).run_subtitles(&input, None, None, true)?;
    assert_eq!(SubtitleFile::load(&output)?.events.len(), 2);
    Ok(())
}

/// Test folder mode: converts, skips existing outputs, ignores other files
#[test]
fn test_runSubtitles_directory_shouldConvertEveryVtt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("day2");
    fs::create_dir_all(&nested)?;
    common::create_auto_captions(temp_dir.path(), "one.vtt")?;
    common::create_auto_captions(&nested, "two.vtt")?;
    common::create_test_file(temp_dir.path(), "readme.txt", "ignored")?;
    common::create_test_file(&nested, "two.ass", "existing")?;

    let summary = controller().run_subtitles(temp_dir.path(), None, None, false)?;

    assert_eq!(summary, FolderSummary { converted: 1, skipped: 1 });
    assert!(temp_dir.path().join("one.ass").exists());
    assert_eq!(fs::read_to_string(nested.join("two.ass"))?, "existing");
    Ok(())
}

/// Test that folder mode rejects an explicit output path
#[test]
fn test_runSubtitles_directoryWithOutput_shouldBeRejected() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("out.ass");

    let result = controller().run_subtitles(temp_dir.path(), Some(output.as_path()), None, false);

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    Ok(())
}

/// Test that folder mode reports failures after processing the rest
#[test]
fn test_runSubtitles_directoryWithBrokenFile_shouldReportPartialFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_auto_captions(temp_dir.path(), "good.vtt")?;
    fs::write(temp_dir.path().join("broken.vtt"), [0xffu8, 0xfe, 0xfd])?;

    let result = controller().run_subtitles(temp_dir.path(), None, None, false);

    assert!(matches!(result, Err(AppError::Partial { failed: 1, total: 2 })));
    assert!(temp_dir.path().join("good.ass").exists());
    Ok(())
}
