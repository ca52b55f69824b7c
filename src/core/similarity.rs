use std::cmp::Ordering;

use crate::models::{Aura, ColorTag, ComboBonus, Location, MatchResult, MatchWeights, Rgb};

/// Largest possible Euclidean distance between two RGB colors (255·√3)
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// Similarity in [0, 1]: 1 for identical colors, 0 for opposite corners of the cube
#[inline]
pub fn color_similarity(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    let distance = (dr * dr + dg * dg + db * db).sqrt();

    (1.0 - distance / MAX_RGB_DISTANCE).clamp(0.0, 1.0)
}

/// Closest questionnaire tag to a color, with its similarity
pub fn nearest_tag(color: Rgb) -> (ColorTag, f64) {
    ColorTag::ALL
        .iter()
        .map(|tag| (*tag, color_similarity(color, tag.rgb())))
        .fold((ColorTag::Red, f64::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
}

/// Thresholds and weights for similarity matching
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    /// A color pair "matches" at or above this similarity
    pub match_threshold: f64,
    /// Strict inclusion when the top-pair average reaches this
    pub inclusion_top_average: f64,
    /// Relaxed pass admits locations whose top-pair average reaches this
    pub relaxed_top_average: f64,
    /// Number of best pairs averaged into `top_average`
    pub top_pairs: usize,
    /// Relaxed pass runs when fewer strict matches than this
    pub min_results: usize,
    /// Strict matches are truncated to this many
    pub max_results: usize,
    /// A reference color counts as a tag for combo bonuses at this similarity
    pub combo_tag_similarity: f64,
    pub weights: MatchWeights,
    pub combo_bonuses: Vec<ComboBonus>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            match_threshold: 0.25,
            inclusion_top_average: 0.6,
            relaxed_top_average: 0.2,
            top_pairs: 4,
            min_results: 10,
            max_results: 75,
            combo_tag_similarity: 0.9,
            weights: MatchWeights::default(),
            combo_bonuses: default_combo_bonuses(),
        }
    }
}

/// Default pairings of aura color category and place type
pub fn default_combo_bonuses() -> Vec<ComboBonus> {
    vec![
        ComboBonus::new(ColorTag::Red, "night_club", 6.0),
        ComboBonus::new(ColorTag::Red, "bar", 4.0),
        ComboBonus::new(ColorTag::Orange, "restaurant", 4.0),
        ComboBonus::new(ColorTag::Orange, "cafe", 3.0),
        ComboBonus::new(ColorTag::Blue, "cafe", 4.0),
        ComboBonus::new(ColorTag::Blue, "park", 3.0),
        ComboBonus::new(ColorTag::Green, "park", 6.0),
        ComboBonus::new(ColorTag::Cyan, "park", 3.0),
        ComboBonus::new(ColorTag::Purple, "bar", 4.0),
        ComboBonus::new(ColorTag::Purple, "restaurant", 3.0),
        ComboBonus::new(ColorTag::Gold, "restaurant", 5.0),
        ComboBonus::new(ColorTag::Yellow, "cafe", 3.0),
    ]
}

/// Pairwise statistics between reference colors and location colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairStats {
    pub count_matches: usize,
    pub distinct_reference: usize,
    pub distinct_location: usize,
    pub top_average: f64,
}

impl PairStats {
    /// Compare every reference color with every location color
    pub fn compute(reference: &[Rgb], colors: &[Rgb], policy: &MatchPolicy) -> Self {
        let mut similarities = Vec::with_capacity(reference.len() * colors.len());
        let mut reference_hit = vec![false; reference.len()];
        let mut location_hit = vec![false; colors.len()];
        let mut count_matches = 0;

        for (i, r) in reference.iter().enumerate() {
            for (j, c) in colors.iter().enumerate() {
                let similarity = color_similarity(*r, *c);
                if similarity >= policy.match_threshold {
                    count_matches += 1;
                    reference_hit[i] = true;
                    location_hit[j] = true;
                }
                similarities.push(similarity);
            }
        }

        similarities.sort_by(|a, b| b.total_cmp(a));
        let top: Vec<f64> = similarities.into_iter().take(policy.top_pairs).collect();
        let top_average = if top.is_empty() {
            0.0
        } else {
            top.iter().sum::<f64>() / top.len() as f64
        };

        Self {
            count_matches,
            distinct_reference: reference_hit.iter().filter(|hit| **hit).count(),
            distinct_location: location_hit.iter().filter(|hit| **hit).count(),
            top_average,
        }
    }

    /// Strict inclusion: any one heuristic is enough
    pub fn qualifies(&self, policy: &MatchPolicy) -> bool {
        self.count_matches >= 2
            || self.top_average >= policy.inclusion_top_average
            || self.distinct_reference >= 2
            || self.distinct_location >= 2
    }

    /// Ranking score before the combo bonus
    pub fn base_score(&self, weights: &MatchWeights) -> f64 {
        self.count_matches as f64 * weights.count_matches
            + self.distinct_reference as f64 * weights.distinct_reference
            + self.distinct_location as f64 * weights.distinct_location
            + self.top_average * weights.top_average
    }
}

/// Outcome of a matching pass over a location pool
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    pub strict_count: usize,
    pub relaxed: bool,
}

/// Scores locations against a reference aura
///
/// # Pipeline
/// 1. Pairwise color comparison per location
/// 2. Strict inclusion, truncated to `max_results`
/// 3. Relaxed fill when fewer than `min_results` qualify
/// 4. Ranking by score
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    policy: MatchPolicy,
}

impl SimilarityMatcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn with_default_policy() -> Self {
        Self {
            policy: MatchPolicy::default(),
        }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Sum of configured bonuses for the aura's color categories at this place type.
    /// Each category counts once, however many aura colors fall into it.
    pub fn combo_bonus(&self, reference: &Aura, place_type: &str) -> f64 {
        let mut tags: Vec<ColorTag> = Vec::with_capacity(3);
        for color in reference.colors() {
            let (tag, similarity) = nearest_tag(color);
            if similarity >= self.policy.combo_tag_similarity && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        self.policy
            .combo_bonuses
            .iter()
            .filter(|combo| tags.contains(&combo.tag) && combo.place_type.eq_ignore_ascii_case(place_type))
            .map(|combo| combo.bonus)
            .sum()
    }

    /// Score one set of canonical colors against the reference aura
    pub fn score_colors(&self, reference: &Aura, colors: &[Rgb], place_type: &str) -> (PairStats, f64) {
        let stats = PairStats::compute(&reference.colors(), colors, &self.policy);
        let score = stats.base_score(&self.policy.weights) + self.combo_bonus(reference, place_type);
        (stats, score.max(0.0))
    }

    /// Score a location against the reference aura
    pub fn score(&self, reference: &Aura, location: &Location) -> MatchResult {
        let (stats, score) = self.score_colors(reference, location.canonical_colors(), &location.place_type);

        MatchResult {
            location_id: location.id.clone(),
            score,
            matched_color_count: stats.count_matches,
            top_average: stats.top_average,
            strict: stats.qualifies(&self.policy),
        }
    }

    /// Run the strict pass over the whole pool, then the relaxed pass if needed
    pub fn match_locations(&self, reference: &Aura, locations: &[Location]) -> MatchOutcome {
        let total_candidates = locations.len();

        let (mut matches, rest): (Vec<MatchResult>, Vec<MatchResult>) = locations
            .iter()
            .map(|location| self.score(reference, location))
            .partition(|result| result.strict);

        sort_by_score(&mut matches);

        if matches.len() > self.policy.max_results {
            tracing::debug!(
                "Truncating {} strict matches to {}",
                matches.len(),
                self.policy.max_results
            );
            matches.truncate(self.policy.max_results);
        }

        let strict_count = matches.len();
        let mut relaxed = false;

        if strict_count < self.policy.min_results {
            let mut fill: Vec<MatchResult> = rest
                .into_iter()
                .filter(|result| result.top_average >= self.policy.relaxed_top_average)
                .collect();
            sort_by_score(&mut fill);
            fill.truncate(self.policy.min_results - strict_count);

            tracing::debug!(
                "Only {} strict matches from {} candidates, relaxed pass added {}",
                strict_count,
                total_candidates,
                fill.len()
            );

            relaxed = !fill.is_empty();
            matches.extend(fill);
            sort_by_score(&mut matches);
        }

        MatchOutcome {
            matches,
            total_candidates,
            strict_count,
            relaxed,
        }
    }
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::with_default_policy()
    }
}

/// Score descending, then location id ascending
fn sort_by_score(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });
}
