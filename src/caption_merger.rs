/*!
 * Caption merging for auto-generated subtitles.
 *
 * Live captioning emits a sliding window of words: each cue repeats most of
 * the previous one and appends a few new words. This module collapses such
 * runs of near-identical consecutive captions into a single event, then
 * drops events too short to be read.
 *
 * The pipeline is `fix_escaped_chars` -> `merge_duplicates` ->
 * `remove_short_events`, wrapped by `process_events`.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::CaptionEvent;

/// Default minimum event duration in milliseconds
pub const DEFAULT_MIN_DURATION_MS: i64 = 100;

/// Below this many tight characters, captions must match exactly
const EXACT_MATCH_THRESHOLD: usize = 5;

// @const: Caption-cue and inline timestamp markers
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(<c>)|(</c>)|(<\d\d:\d\d:\d\d.\d\d\d>)").unwrap()
});

// @const: Runs of the space character only
static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x20+").unwrap());

// @const: Any whitespace
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonical form of a caption text used for duplicate detection
#[derive(Debug, Clone)]
pub struct NormalizedText {
    /// Markup removed, space runs collapsed
    text: String,

    /// `text` without any whitespace
    tight: String,

    /// Character count of `tight`
    len: usize,
}

impl NormalizedText {
    /// Normalize raw caption text
    pub fn new(raw: &str) -> Self {
        let stripped = MARKUP_REGEX.replace_all(raw, " ");
        let text = SPACE_REGEX.replace_all(&stripped, " ").into_owned();
        let tight = WHITESPACE_REGEX.replace_all(&text, "").into_owned();
        let len = tight.chars().count();

        Self { text, tight, len }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tight(&self) -> &str {
        &self.tight
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether two captions carry the same content
    ///
    /// Short captions must be identical once whitespace is removed. Longer
    /// ones match when one is a prefix of the other, which is how a growing
    /// live-caption window looks from one cue to the next.
    pub fn matches(&self, other: &NormalizedText) -> bool {
        if self.len < EXACT_MATCH_THRESHOLD || other.len < EXACT_MATCH_THRESHOLD {
            return self.tight == other.tight;
        }

        let (shorter, longer) = if self.len >= other.len {
            (&other.tight, &self.tight)
        } else {
            (&self.tight, &other.tight)
        };
        longer.starts_with(shorter.as_str())
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Events handed to the pipeline
    pub input_events: usize,

    /// Events left after merging duplicates
    pub merged_events: usize,

    /// Events dropped for being too short
    pub removed_short: usize,

    /// Events in the final output
    pub output_events: usize,
}

// @struct: Event waiting in the current pool
struct Pooled {
    event: CaptionEvent,
    text: NormalizedText,
}

/// Replace HTML-escaped ampersands with the literal character
pub fn fix_escaped_chars(events: &mut [CaptionEvent]) {
    for event in events.iter_mut() {
        if event.text.contains("&amp;") {
            event.text = event.text.replace("&amp;", "&");
        }
    }
}

/// Collapse runs of near-identical consecutive captions
///
/// Each incoming caption is compared against the last caption of the current
/// pool only. When the chain breaks, the pool is flushed into one event that
/// carries the shortest member's normalized text, trimmed, and spans the
/// whole pool.
///
/// The final pool is emitted as its first event, untouched. This differs
/// from interior flushes and is kept so output matches files converted by
/// earlier releases.
pub fn merge_duplicates(events: Vec<CaptionEvent>) -> Vec<CaptionEvent> {
    let mut merged = Vec::with_capacity(events.len());
    let mut pool: Vec<Pooled> = Vec::new();

    for mut event in events {
        let text = NormalizedText::new(&event.text);

        let breaks_chain = pool
            .last()
            .is_some_and(|last| !last.text.matches(&text));

        if breaks_chain {
            if let Some(representative) = flush_pool(std::mem::take(&mut pool), &mut event) {
                merged.push(representative);
            }
        }

        pool.push(Pooled { event, text });
    }

    if let Some(first) = pool.into_iter().next() {
        merged.push(first.event);
    }

    merged
}

// @flushes: Pool into one representative event
// @mutates: `next` start when the last pooled caption spans two lines
fn flush_pool(pool: Vec<Pooled>, next: &mut CaptionEvent) -> Option<CaptionEvent> {
    let first_start = pool.first()?.event.start_ms;
    let last_index = pool.len() - 1;
    let last = pool.last()?;
    let (last_start, last_end) = (last.event.start_ms, last.event.end_ms);
    let last_is_multiline = last.text.text().contains('\n');

    // min_by_key keeps the earliest of equal minimums
    let shortest = pool
        .iter()
        .enumerate()
        .min_by_key(|(_, pooled)| pooled.text.len())
        .map(|(index, _)| index)?;

    let Pooled { mut event, text } = pool.into_iter().nth(shortest)?;
    event.text = text.text.trim().to_string();
    event.start_ms = first_start;
    event.end_ms = last_end;

    if last_is_multiline {
        // A representative that is itself the last caption has already
        // been moved to the pool start
        let split_at = if shortest == last_index { first_start } else { last_start };
        next.start_ms = split_at;
        event.end_ms = split_at;
    }

    Some(event)
}

/// Drop events shorter than `min_duration_ms`
pub fn remove_short_events(events: Vec<CaptionEvent>, min_duration_ms: i64) -> Vec<CaptionEvent> {
    events
        .into_iter()
        .filter(|event| event.duration_ms() >= min_duration_ms)
        .collect()
}

/// Run cleanup, merging and filtering over a decoded event list
pub fn process_events(mut events: Vec<CaptionEvent>, min_duration_ms: i64) -> (Vec<CaptionEvent>, MergeReport) {
    let input_events = events.len();

    fix_escaped_chars(&mut events);
    let merged = merge_duplicates(events);
    let merged_events = merged.len();
    let filtered = remove_short_events(merged, min_duration_ms);

    let report = MergeReport {
        input_events,
        merged_events,
        removed_short: merged_events - filtered.len(),
        output_events: filtered.len(),
    };

    (filtered, report)
}
