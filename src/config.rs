use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::similarity::{default_combo_bonuses, MatchPolicy};
use crate::core::viewport::{default_zoom_bands, ViewportPolicy, ZoomBand};
use crate::models::{ComboBonus, MatchWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_color_cache_size")]
    pub color_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            color_cache_size: default_color_cache_size(),
        }
    }
}

fn default_color_cache_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_inclusion_top_average")]
    pub inclusion_top_average: f64,
    #[serde(default = "default_relaxed_top_average")]
    pub relaxed_top_average: f64,
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,
    #[serde(default = "default_min_results")]
    pub min_results: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_combo_tag_similarity")]
    pub combo_tag_similarity: f64,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default = "default_combo_bonuses")]
    pub combo_bonuses: Vec<ComboBonus>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            inclusion_top_average: default_inclusion_top_average(),
            relaxed_top_average: default_relaxed_top_average(),
            top_pairs: default_top_pairs(),
            min_results: default_min_results(),
            max_results: default_max_results(),
            combo_tag_similarity: default_combo_tag_similarity(),
            weights: WeightsConfig::default(),
            combo_bonuses: default_combo_bonuses(),
        }
    }
}

fn default_match_threshold() -> f64 { 0.25 }
fn default_inclusion_top_average() -> f64 { 0.6 }
fn default_relaxed_top_average() -> f64 { 0.2 }
fn default_top_pairs() -> usize { 4 }
fn default_min_results() -> usize { 10 }
fn default_max_results() -> usize { 75 }
fn default_combo_tag_similarity() -> f64 { 0.9 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_count_matches_weight")]
    pub count_matches: f64,
    #[serde(default = "default_distinct_reference_weight")]
    pub distinct_reference: f64,
    #[serde(default = "default_distinct_location_weight")]
    pub distinct_location: f64,
    #[serde(default = "default_top_average_weight")]
    pub top_average: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            count_matches: default_count_matches_weight(),
            distinct_reference: default_distinct_reference_weight(),
            distinct_location: default_distinct_location_weight(),
            top_average: default_top_average_weight(),
        }
    }
}

fn default_count_matches_weight() -> f64 { 5.0 }
fn default_distinct_reference_weight() -> f64 { 10.0 }
fn default_distinct_location_weight() -> f64 { 10.0 }
fn default_top_average_weight() -> f64 { 20.0 }

impl From<&WeightsConfig> for MatchWeights {
    fn from(weights: &WeightsConfig) -> Self {
        MatchWeights {
            count_matches: weights.count_matches,
            distinct_reference: weights.distinct_reference,
            distinct_location: weights.distinct_location,
            top_average: weights.top_average,
        }
    }
}

impl From<&MatchingSettings> for MatchPolicy {
    fn from(settings: &MatchingSettings) -> Self {
        MatchPolicy {
            match_threshold: settings.match_threshold,
            inclusion_top_average: settings.inclusion_top_average,
            relaxed_top_average: settings.relaxed_top_average,
            top_pairs: settings.top_pairs,
            min_results: settings.min_results,
            max_results: settings.max_results,
            combo_tag_similarity: settings.combo_tag_similarity,
            weights: MatchWeights::from(&settings.weights),
            combo_bonuses: settings.combo_bonuses.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportSettings {
    #[serde(default = "default_fallback_radius_km")]
    pub fallback_radius_km: f64,
    #[serde(default = "default_zoom_bands")]
    pub zoom_bands: Vec<ZoomBand>,
    #[serde(default = "default_max_count")]
    pub default_max_count: usize,
    #[serde(default = "default_overlap_pixels")]
    pub overlap_pixels: f64,
    #[serde(default = "default_spread_gap_pixels")]
    pub spread_gap_pixels: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            fallback_radius_km: default_fallback_radius_km(),
            zoom_bands: default_zoom_bands(),
            default_max_count: default_max_count(),
            overlap_pixels: default_overlap_pixels(),
            spread_gap_pixels: default_spread_gap_pixels(),
        }
    }
}

fn default_fallback_radius_km() -> f64 { 5.0 }
fn default_max_count() -> usize { 180 }
fn default_overlap_pixels() -> f64 { 20.0 }
fn default_spread_gap_pixels() -> f64 { 24.0 }

impl From<&ViewportSettings> for ViewportPolicy {
    fn from(settings: &ViewportSettings) -> Self {
        ViewportPolicy {
            fallback_radius_km: settings.fallback_radius_km,
            zoom_bands: settings.zoom_bands.clone(),
            default_max_count: settings.default_max_count,
            overlap_pixels: settings.overlap_pixels,
            spread_gap_pixels: settings.spread_gap_pixels,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with AURA__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., AURA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("AURA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("AURA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
