/*!
 * Subtitle loading and ASS output.
 *
 * WebVTT, SubRip and ASS input are decoded into plain caption events. Cue
 * markup such as `<c>` or voice spans is dropped while decoding; italic,
 * bold, underline and strikeout tags are kept and become ASS overrides on
 * output. Inline `<hh:mm:ss.mmm>` word timings are left for the merger.
 */

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use regex::{Captures, Regex};
use once_cell::sync::Lazy;
use log::{debug, warn};
use crate::errors::SubtitleError;

// @const: WebVTT cue timing line, hours optional
static VTT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})\s+-->\s+(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})").unwrap()
});

// @const: SRT timestamp regex
static SRT_TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: ASS timestamp (h:mm:ss.cc)
static ASS_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

// @const: ASS override blocks
static ASS_OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

// @const: HTML style tags with an ASS equivalent
static STYLE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(/?)([ibusIBUS])>").unwrap());

// @const: Remaining markup that ASS cannot represent
static OTHER_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[a-zA-Z][^>]*>|<\d+:\d{2}:\d{2}\.\d{3}>").unwrap()
});

// @const: Cue markup tags, with the tag name captured
static CUE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?([a-zA-Z][^\s>]*)[^>]*>").unwrap());

const ASS_HEADER: &str = "[Script Info]
; Script generated by utoolkit
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
Collisions: Normal
PlayResX: 640
PlayResY: 480

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Single timed caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEvent {
    /// Start time in ms
    pub start_ms: i64,

    /// End time in ms
    pub end_ms: i64,

    /// Plain text, lines separated by '\n'
    pub text: String,
}

impl CaptionEvent {
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        CaptionEvent {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Duration in milliseconds; negative for inverted timings
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Subtitle formats that can be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtitleFormat {
    WebVtt,
    Srt,
    Ass,
}

impl SubtitleFormat {
    /// Detect the format from the file content
    pub fn detect(content: &str) -> Option<Self> {
        let content = content.trim_start();
        if content.starts_with("WEBVTT") {
            Some(Self::WebVtt)
        } else if content.starts_with("[Script Info]") {
            Some(Self::Ass)
        } else if SRT_TIMING_REGEX.is_match(content) && content.contains(',') {
            Some(Self::Srt)
        } else {
            None
        }
    }

    /// Guess the format from a file extension
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "vtt" => Some(Self::WebVtt),
            "srt" => Some(Self::Srt),
            "ass" | "ssa" => Some(Self::Ass),
            _ => None,
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WebVtt => "WebVTT",
            Self::Srt => "SubRip",
            Self::Ass => "ASS",
        };
        write!(f, "{}", name)
    }
}

/// A decoded subtitle file
#[derive(Debug, Clone)]
pub struct SubtitleFile {
    /// Source filename
    pub source_file: PathBuf,

    /// Detected input format
    pub format: SubtitleFormat,

    /// Caption events in file order
    pub events: Vec<CaptionEvent>,
}

impl SubtitleFile {
    /// Load and decode a subtitle file, detecting its format
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let content = decode_content(bytes).ok_or_else(|| SubtitleError::Decode {
            path: path.to_path_buf(),
        })?;

        let format = SubtitleFormat::detect(&content)
            .or_else(|| SubtitleFormat::from_extension(path))
            .ok_or_else(|| SubtitleError::UnknownFormat {
                path: path.to_path_buf(),
            })?;

        let events = Self::parse_str(&content, format);
        debug!("Loaded {} {} events from {:?}", events.len(), format, path);

        Ok(SubtitleFile {
            source_file: path.to_path_buf(),
            format,
            events,
        })
    }

    /// Parse already decoded content in the given format
    pub fn parse_str(content: &str, format: SubtitleFormat) -> Vec<CaptionEvent> {
        match format {
            SubtitleFormat::WebVtt => parse_vtt(content),
            SubtitleFormat::Srt => parse_srt(content),
            SubtitleFormat::Ass => parse_ass(content),
        }
    }

    /// Render events as an ASS document
    pub fn to_ass_string(events: &[CaptionEvent]) -> String {
        let mut output = String::from(ASS_HEADER);
        for event in events {
            output.push_str(&format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
                format_ass_timestamp(event.start_ms),
                format_ass_timestamp(event.end_ms),
                to_ass_text(&event.text)
            ));
        }
        output
    }

    /// Write events to an ASS file, creating parent directories
    pub fn save_ass<P: AsRef<Path>>(events: &[CaptionEvent], path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let write_err = |source| SubtitleError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        fs::write(path, Self::to_ass_string(events)).map_err(write_err)
    }
}

impl fmt::Display for SubtitleFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle File")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Events: {}", self.events.len())?;
        Ok(())
    }
}

// @decodes: UTF-8 with optional BOM, line endings normalized to LF
fn decode_content(bytes: Vec<u8>) -> Option<String> {
    let content = String::from_utf8(bytes).ok()?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);
    Some(content.replace("\r\n", "\n").replace('\r', "\n"))
}

// @splits: Content into blocks separated by empty lines
fn blocks(content: &str, blank: fn(&str) -> bool) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if blank(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

// @returns: None when a field does not fit or the total overflows
fn timestamp_to_ms(caps: &Captures, start_idx: usize, frac_scale: i64) -> Option<i64> {
    let field = |idx: usize| -> Option<i64> {
        caps.get(idx).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let hours = field(start_idx)?;
    let minutes = field(start_idx + 1)?;
    let seconds = field(start_idx + 2)?;
    let fraction = field(start_idx + 3)?;

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(1000)?
        .checked_add(fraction * frac_scale)
}

// @returns: Start and end of a matched timing line
fn timing_range(caps: &Captures) -> Option<(i64, i64)> {
    Some((timestamp_to_ms(caps, 1, 1)?, timestamp_to_ms(caps, 5, 1)?))
}

// @joins: Cue text lines, markup and surrounding whitespace dropped
fn cue_text(lines: &[&str]) -> String {
    let text = lines.join("\n");
    let text = CUE_TAG_REGEX.replace_all(&text, |caps: &Captures| {
        if STYLE_TAG_REGEX.is_match(&caps[0]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    text.trim().to_string()
}

/// Parse WebVTT content into caption events
///
/// Cue settings are ignored. Cue markup is dropped, while the inline
/// timestamp markers of auto-generated captions reach the merger intact.
fn parse_vtt(content: &str) -> Vec<CaptionEvent> {
    let mut events = Vec::new();

    // Whitespace-only lines can occur inside cues; only empty lines end one
    for block in blocks(content, str::is_empty) {
        let first = block[0].trim_start();
        if first.starts_with("WEBVTT")
            || first.starts_with("NOTE")
            || first.starts_with("STYLE")
            || first.starts_with("REGION")
        {
            continue;
        }

        let Some(timing_idx) = block.iter().take(2).position(|line| line.contains("-->")) else {
            warn!("Skipping VTT block without timing line: {}", first);
            continue;
        };

        let Some(caps) = VTT_TIMING_REGEX.captures(block[timing_idx].trim()) else {
            warn!("Invalid VTT timing line: {}", block[timing_idx]);
            continue;
        };

        let Some((start_ms, end_ms)) = timing_range(&caps) else {
            warn!("VTT timestamp out of range: {}", block[timing_idx]);
            continue;
        };

        events.push(CaptionEvent::new(start_ms, end_ms, cue_text(&block[timing_idx + 1..])));
    }

    events
}

/// Parse SubRip content into caption events
fn parse_srt(content: &str) -> Vec<CaptionEvent> {
    let mut events = Vec::new();

    for block in blocks(content, |line| line.trim().is_empty()) {
        let Some(timing_idx) = block.iter().take(2).position(|line| SRT_TIMING_REGEX.is_match(line)) else {
            warn!("Unexpected text before sequence number or timestamp: {}", block[0]);
            continue;
        };

        let Some(caps) = SRT_TIMING_REGEX.captures(block[timing_idx]) else {
            continue;
        };

        let Some((start_ms, end_ms)) = timing_range(&caps) else {
            warn!("SRT timestamp out of range: {}", block[timing_idx]);
            continue;
        };

        events.push(CaptionEvent::new(start_ms, end_ms, cue_text(&block[timing_idx + 1..])));
    }

    events
}

/// Parse the `[Events]` section of an ASS/SSA script
fn parse_ass(content: &str) -> Vec<CaptionEvent> {
    let mut events = Vec::new();
    let mut in_events = false;
    let mut columns: Vec<String> = ["Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    for line in content.lines() {
        // Trailing whitespace belongs to the dialogue text
        let line = line.trim_start();
        if line.starts_with('[') {
            in_events = line.trim_end().eq_ignore_ascii_case("[Events]");
            continue;
        }
        if !in_events {
            continue;
        }

        if let Some(format) = line.strip_prefix("Format:") {
            columns = format.split(',').map(|c| c.trim().to_string()).collect();
            continue;
        }

        let Some(fields) = line.strip_prefix("Dialogue:") else {
            continue;
        };

        let values: Vec<&str> = fields.trim_start().splitn(columns.len(), ',').collect();
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .and_then(|idx| values.get(idx))
                .map(|v| v.trim())
        };

        let (Some(start), Some(end), Some(text)) = (
            column("Start").and_then(parse_ass_timestamp),
            column("End").and_then(parse_ass_timestamp),
            columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case("Text"))
                .and_then(|idx| values.get(idx)),
        ) else {
            warn!("Skipping malformed Dialogue line: {}", line);
            continue;
        };

        events.push(CaptionEvent::new(start, end, ass_plaintext(text)));
    }

    events
}

fn parse_ass_timestamp(value: &str) -> Option<i64> {
    let caps = ASS_TIME_REGEX.captures(value)?;
    timestamp_to_ms(&caps, 1, 10)
}

// @converts: ASS dialogue text to plain text
fn ass_plaintext(text: &str) -> String {
    ASS_OVERRIDE_REGEX
        .replace_all(text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
}

/// Format milliseconds as an ASS timestamp (h:mm:ss.cc)
pub fn format_ass_timestamp(ms: i64) -> String {
    let centis = (ms.max(0) + 5) / 10;
    let hours = centis / 360_000;
    let minutes = (centis % 360_000) / 6_000;
    let seconds = (centis % 6_000) / 100;
    let cs = centis % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
}

// @converts: Plain caption text to ASS dialogue text
fn to_ass_text(text: &str) -> String {
    let styled = STYLE_TAG_REGEX.replace_all(text, |caps: &Captures| {
        let state = if caps[1].is_empty() { 1 } else { 0 };
        format!("{{\\{}{}}}", caps[2].to_lowercase(), state)
    });
    OTHER_TAG_REGEX
        .replace_all(&styled, "")
        .replace('\n', "\\N")
}
