use moka::sync::Cache;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ColorTag, Location, LocationRecord, RawColor, Rgb};

/// Returned when nothing in a raw value parses as a color
pub const FALLBACK_COLOR: Rgb = Rgb::new(0x80, 0x80, 0x80);

/// `#RRGGBB` or `#RGB`; the 6-digit alternative is tried first so it wins
/// over an overlapping 3-digit match. Longer runs (e.g. `#RRGGBBAA`) yield
/// their first six digits.
static HEX_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})").expect("hex token pattern"));

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("word token pattern"));

/// Color words recognized in addition to the questionnaire tags
const EXTRA_COLOR_WORDS: &[(&str, Rgb)] = &[
    ("white", Rgb::new(0xFF, 0xFF, 0xFF)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("grey", Rgb::new(0x80, 0x80, 0x80)),
    ("pink", Rgb::new(0xFF, 0xC0, 0xCB)),
    ("brown", Rgb::new(0xA5, 0x2A, 0x2A)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("magenta", Rgb::new(0xFF, 0x00, 0xFF)),
    ("indigo", Rgb::new(0x4B, 0x00, 0x82)),
    ("violet", Rgb::new(0xEE, 0x82, 0xEE)),
];

/// Look up a single color word, case-insensitively
pub fn color_word(word: &str) -> Option<Rgb> {
    if let Ok(tag) = word.parse::<ColorTag>() {
        return Some(tag.rgb());
    }
    let lowered = word.to_ascii_lowercase();
    EXTRA_COLOR_WORDS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, rgb)| *rgb)
}

/// All well-formed hex tokens in textual order
pub fn extract_hex_tokens(text: &str) -> Vec<Rgb> {
    HEX_TOKEN
        .find_iter(text)
        .filter_map(|m| Rgb::parse_hex(m.as_str()).ok())
        .collect()
}

fn extract_color_words(text: &str) -> Vec<Rgb> {
    WORD_TOKEN
        .find_iter(text)
        .filter_map(|m| color_word(m.as_str()))
        .collect()
}

/// Colors in one stored string: `#` hex tokens, else color words
fn parse_text(text: &str) -> Vec<Rgb> {
    let tokens = extract_hex_tokens(text);
    if !tokens.is_empty() {
        return tokens;
    }

    extract_color_words(text)
}

/// Normalize any stored color representation into canonical colors
///
/// Never returns an empty list: when nothing parses, the result is
/// `[FALLBACK_COLOR]`. Malformed tokens are skipped silently.
pub fn canonicalize(raw: &RawColor) -> Vec<Rgb> {
    let colors = match raw {
        // Only an explicit hex value may omit the `#`
        RawColor::Hex(value) => match Rgb::parse_hex(value) {
            Ok(rgb) => vec![rgb],
            Err(_) => parse_text(value),
        },
        RawColor::Text(value)
        | RawColor::Tagged(value)
        | RawColor::Nested { color: value, .. } => parse_text(value),
        RawColor::Slots(slots) => slots.iter().flat_map(|slot| parse_text(slot)).collect(),
        RawColor::Missing => Vec::new(),
    };

    if colors.is_empty() {
        tracing::trace!("No parseable color in {:?}, using fallback", raw);
        vec![FALLBACK_COLOR]
    } else {
        colors
    }
}

/// Memoizing front for [`canonicalize`]
///
/// Results are pure, so the cache can be shared freely between workers.
#[derive(Clone)]
pub struct ColorCodec {
    cache: Cache<RawColor, Vec<Rgb>>,
}

impl ColorCodec {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    pub fn canonicalize(&self, raw: &RawColor) -> Vec<Rgb> {
        self.cache.get_with(raw.clone(), || canonicalize(raw))
    }

    /// Classify a stored record's color fields and build the location
    pub fn ingest(&self, record: LocationRecord) -> Location {
        let raw = record.colors.into_raw();
        let canonical = self.canonicalize(&raw);
        Location::with_canonical(
            record.id,
            record.latitude,
            record.longitude,
            raw,
            canonical,
            record.place_type,
            record.importance_score,
        )
        .with_name(record.name)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for ColorCodec {
    fn default() -> Self {
        Self::new(10_000)
    }
}
