use chrono::{DateTime, Utc};
use geo::{coord, Intersects, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::color::canonicalize;
use crate::error::ParseError;

/// Canonical RGB color, 0-255 per channel
///
/// Serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `#RGB`, or the same digits without the leading `#`
    pub fn parse_hex(value: &str) -> Result<Self, ParseError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidHex(value.to_string()));
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ParseError::InvalidHex(value.to_string()));

        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(ParseError::InvalidHex(value.to_string())),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

/// Category tag a questionnaire option can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ColorTag {
    Red,
    Blue,
    Orange,
    Purple,
    Green,
    Cyan,
    Gold,
    Yellow,
}

impl ColorTag {
    pub const ALL: [ColorTag; 8] = [
        ColorTag::Red,
        ColorTag::Blue,
        ColorTag::Orange,
        ColorTag::Purple,
        ColorTag::Green,
        ColorTag::Cyan,
        ColorTag::Gold,
        ColorTag::Yellow,
    ];

    /// The one tag-to-color table
    pub const fn rgb(self) -> Rgb {
        match self {
            ColorTag::Red => Rgb::new(0xFF, 0x00, 0x00),
            ColorTag::Blue => Rgb::new(0x00, 0x00, 0xFF),
            ColorTag::Orange => Rgb::new(0xFF, 0xA5, 0x00),
            ColorTag::Purple => Rgb::new(0x80, 0x00, 0x80),
            ColorTag::Green => Rgb::new(0x00, 0xFF, 0x00),
            ColorTag::Cyan => Rgb::new(0x00, 0xFF, 0xFF),
            ColorTag::Gold => Rgb::new(0xFF, 0xD7, 0x00),
            ColorTag::Yellow => Rgb::new(0xFF, 0xFF, 0x00),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ColorTag::Red => "red",
            ColorTag::Blue => "blue",
            ColorTag::Orange => "orange",
            ColorTag::Purple => "purple",
            ColorTag::Green => "green",
            ColorTag::Cyan => "cyan",
            ColorTag::Gold => "gold",
            ColorTag::Yellow => "yellow",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ColorTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == lowered)
            .ok_or_else(|| ParseError::UnknownTag(s.to_string()))
    }
}

impl TryFrom<String> for ColorTag {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Motion shape derived from response latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuraShape {
    Sparkling,
    Flowing,
    Pulsing,
    Balanced,
}

/// Animation speed derived from mean response latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuraSpeed {
    Fast,
    MediumFast,
    Medium,
    MediumSlow,
    Slow,
}

/// A user's derived signature: three colors ordered by selection frequency,
/// plus shape and speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aura {
    pub color1: Rgb,
    pub color2: Rgb,
    pub color3: Rgb,
    pub shape: AuraShape,
    pub speed: AuraSpeed,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ColorTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_at: Option<DateTime<Utc>>,
}

impl Aura {
    pub fn new(colors: [Rgb; 3], shape: AuraShape, speed: AuraSpeed) -> Self {
        let [color1, color2, color3] = colors;
        Self {
            color1,
            color2,
            color3,
            shape,
            speed,
            tags: Vec::new(),
            derived_at: None,
        }
    }

    pub fn colors(&self) -> [Rgb; 3] {
        [self.color1, self.color2, self.color3]
    }
}

/// One answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswer {
    #[serde(alias = "question_index")]
    pub question_index: u32,
    pub tag: ColorTag,
    #[serde(alias = "latency_ms")]
    pub latency_ms: u64,
}

impl QuestionnaireAnswer {
    pub fn new(question_index: u32, tag: ColorTag, latency_ms: u64) -> Self {
        Self {
            question_index,
            tag,
            latency_ms,
        }
    }
}

/// Stored color representation, classified once at ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RawColor {
    /// A single hex value, with or without `#`
    Hex(String),
    /// Free text: a gradient with several hex tokens, or a color word
    Text(String),
    /// Explicit `aura_color1..3` fields, in slot order
    Slots(Vec<String>),
    /// An `aura: { color, shape }` object
    Nested { color: String, shape: Option<String> },
    /// Color of the first attached tag
    Tagged(String),
    #[default]
    Missing,
}

impl RawColor {
    /// Classify a `#`-prefixed hex value as `Hex`, anything else as `Text`
    pub fn from_text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim_start().starts_with('#') && Rgb::parse_hex(&value).is_ok() {
            RawColor::Hex(value)
        } else {
            RawColor::Text(value)
        }
    }
}

/// Nested `aura` object as stored on a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedAura {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
}

/// Tag attached to a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Every color-bearing field a stored record may carry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorFields {
    #[serde(default)]
    pub aura: Option<NestedAura>,
    #[serde(default, alias = "auraColor1")]
    pub aura_color1: Option<String>,
    #[serde(default, alias = "auraColor2")]
    pub aura_color2: Option<String>,
    #[serde(default, alias = "auraColor3")]
    pub aura_color3: Option<String>,
    #[serde(default, alias = "auraColor")]
    pub aura_color: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ColorFields {
    /// Precedence: nested aura color, color slots, aura color string, first tag color
    pub fn into_raw(self) -> RawColor {
        if let Some(aura) = &self.aura {
            if let Some(color) = non_empty(&aura.color) {
                return RawColor::Nested {
                    color: color.to_string(),
                    shape: aura.shape.clone(),
                };
            }
        }

        if let (Some(first), Some(second)) = (non_empty(&self.aura_color1), non_empty(&self.aura_color2)) {
            let mut slots = vec![first.to_string(), second.to_string()];
            if let Some(third) = non_empty(&self.aura_color3) {
                slots.push(third.to_string());
            }
            return RawColor::Slots(slots);
        }

        if let Some(color) = non_empty(&self.aura_color) {
            return RawColor::from_text(color);
        }

        if let Some(color) = self.tags.first().and_then(|tag| non_empty(&tag.color)) {
            return RawColor::Tagged(color.to_string());
        }

        RawColor::Missing
    }
}

/// Location identifier as stored: numeric or textual
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Number(n) => n.to_string(),
            RecordId::Text(s) => s,
        }
    }
}

/// Location as delivered by the storage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, rename = "placeType", alias = "place_type")]
    pub place_type: String,
    #[serde(default, rename = "importanceScore", alias = "importance_score", alias = "rating")]
    pub importance_score: f64,
    #[serde(flatten)]
    pub colors: ColorFields,
}

/// Point of interest with its canonical colors cached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LocationRecord")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "placeType")]
    pub place_type: String,
    #[serde(rename = "importanceScore")]
    pub importance_score: f64,
    #[serde(skip)]
    raw_colors: RawColor,
    #[serde(rename = "colors")]
    canonical_colors: Vec<Rgb>,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        raw_colors: RawColor,
        place_type: impl Into<String>,
        importance_score: f64,
    ) -> Self {
        let canonical_colors = canonicalize(&raw_colors);
        Self::with_canonical(id, latitude, longitude, raw_colors, canonical_colors, place_type, importance_score)
    }

    /// Build from already-canonicalized colors (e.g. from a memoized codec)
    pub fn with_canonical(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        raw_colors: RawColor,
        canonical_colors: Vec<Rgb>,
        place_type: impl Into<String>,
        importance_score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            latitude,
            longitude,
            place_type: place_type.into(),
            importance_score,
            raw_colors,
            canonical_colors,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn raw_colors(&self) -> &RawColor {
        &self.raw_colors
    }

    /// Never empty
    pub fn canonical_colors(&self) -> &[Rgb] {
        &self.canonical_colors
    }

    /// Replace the stored colors; the canonical projection is only recomputed on change
    pub fn set_raw_colors(&mut self, raw_colors: RawColor) {
        if self.raw_colors != raw_colors {
            self.canonical_colors = canonicalize(&raw_colors);
            self.raw_colors = raw_colors;
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl From<LocationRecord> for Location {
    fn from(record: LocationRecord) -> Self {
        Location::new(
            record.id,
            record.latitude,
            record.longitude,
            record.colors.into_raw(),
            record.place_type,
            record.importance_score,
        )
        .with_name(record.name)
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    /// Boundary-inclusive containment
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.to_rect().intersects(&Point::from(point))
    }

    /// Bounds are usable when finite and non-degenerate
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat < self.max_lat
            && self.min_lon < self.max_lon
    }
}

/// Visible map region for one render frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    pub zoom: f64,
    #[serde(default)]
    pub last_known_position: Option<GeoPoint>,
}

/// Similarity of one location against a reference aura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub location_id: String,
    pub score: f64,
    pub matched_color_count: usize,
    pub top_average: f64,
    /// Passes the strict inclusion heuristics; `false` in a match set means
    /// the location was admitted by the relaxed pass
    pub strict: bool,
}

/// Filter applied before spatial selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActiveFilter {
    #[default]
    All,
    PlaceType {
        #[serde(rename = "placeType")]
        place_type: String,
    },
    AuraMatch {
        aura: Aura,
    },
}

/// Selected location with its resolved render position
#[derive(Debug, Clone, Serialize)]
pub struct Marker<'a> {
    pub location: &'a Location,
    pub position: GeoPoint,
    pub displaced: bool,
}

/// Ranking weights for similarity scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub count_matches: f64,
    pub distinct_reference: f64,
    pub distinct_location: f64,
    pub top_average: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            count_matches: 5.0,
            distinct_reference: 10.0,
            distinct_location: 10.0,
            top_average: 20.0,
        }
    }
}

/// Bonus for a reference color category paired with a place type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboBonus {
    pub tag: ColorTag,
    pub place_type: String,
    pub bonus: f64,
}

impl ComboBonus {
    pub fn new(tag: ColorTag, place_type: impl Into<String>, bonus: f64) -> Self {
        Self {
            tag,
            place_type: place_type.into(),
            bonus,
        }
    }
}
