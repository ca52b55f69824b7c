use rand::rngs::ThreadRng;
use rand::Rng;

use crate::models::{Aura, AuraShape, AuraSpeed, ColorTag, QuestionnaireAnswer};

/// Mean latency below this is "sparkling"
pub const SPARKLING_BELOW_MS: f64 = 2000.0;
/// Mean latency above this is "flowing"
pub const FLOWING_ABOVE_MS: f64 = 3500.0;
/// Within the mid band, a latency spread above this is "pulsing"
pub const PULSING_RANGE_ABOVE_MS: u64 = 3000;

/// Upper bounds (exclusive) of the speed buckets, slowest bucket last
const SPEED_BOUNDS_MS: [(f64, AuraSpeed); 4] = [
    (1500.0, AuraSpeed::Fast),
    (3000.0, AuraSpeed::MediumFast),
    (5000.0, AuraSpeed::Medium),
    (8000.0, AuraSpeed::MediumSlow),
];

/// Colors used when the questionnaire yields fewer than three distinct tags,
/// and for an empty questionnaire
pub const DEFAULT_TAGS: [ColorTag; 3] = [ColorTag::Blue, ColorTag::Purple, ColorTag::Green];

/// Source of the third-color tie-break draw
pub trait TieBreak {
    /// Pick an index in `0..candidates`; `candidates` is always at least 2
    fn choose(&mut self, candidates: usize) -> usize;
}

/// Uniform tie-break backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomTieBreak<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomTieBreak<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTieBreak<ThreadRng> {
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> TieBreak for RandomTieBreak<R> {
    fn choose(&mut self, candidates: usize) -> usize {
        self.rng.gen_range(0..candidates)
    }
}

/// Tag counts in first-appearance order, sorted by count descending.
/// The sort is stable, so equal counts keep the order they were first answered in.
fn ranked_tags(answers: &[QuestionnaireAnswer]) -> Vec<(ColorTag, usize)> {
    let mut counts: Vec<(ColorTag, usize)> = Vec::new();
    for answer in answers {
        match counts.iter_mut().find(|(tag, _)| *tag == answer.tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((answer.tag, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Pick the three aura tags: the two most frequent unconditionally, then the
/// next-highest count with a tie-break draw when several tags share it.
pub fn select_tags<T: TieBreak + ?Sized>(answers: &[QuestionnaireAnswer], tie_break: &mut T) -> [ColorTag; 3] {
    let ranked = ranked_tags(answers);
    let mut selected: Vec<ColorTag> = ranked.iter().take(2).map(|(tag, _)| *tag).collect();

    if let Some(&(_, third_count)) = ranked.get(2) {
        let tied: Vec<ColorTag> = ranked[2..]
            .iter()
            .filter(|(_, count)| *count == third_count)
            .map(|(tag, _)| *tag)
            .collect();

        let third = if tied.len() == 1 {
            tied[0]
        } else {
            let drawn = tie_break.choose(tied.len());
            debug_assert!(drawn < tied.len(), "tie-break drew {} of {} candidates", drawn, tied.len());
            let index = drawn.min(tied.len() - 1);
            tracing::debug!("Third color tied between {:?} (count {}), drew {}", tied, third_count, tied[index]);
            tied[index]
        };
        selected.push(third);
    }

    for tag in DEFAULT_TAGS {
        if selected.len() == 3 {
            break;
        }
        if !selected.contains(&tag) {
            selected.push(tag);
        }
    }

    [selected[0], selected[1], selected[2]]
}

/// Latency summary over a non-empty answer list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyStats {
    pub fn from_answers(answers: &[QuestionnaireAnswer]) -> Option<Self> {
        let min_ms = answers.iter().map(|a| a.latency_ms).min()?;
        let max_ms = answers.iter().map(|a| a.latency_ms).max()?;
        let total: f64 = answers.iter().map(|a| a.latency_ms as f64).sum();

        Some(Self {
            mean_ms: total / answers.len() as f64,
            min_ms,
            max_ms,
        })
    }

    pub fn range_ms(&self) -> u64 {
        self.max_ms - self.min_ms
    }
}

/// Shape, checked in order: sparkling, flowing, then pulsing within the mid band
pub fn classify_shape(stats: &LatencyStats) -> AuraShape {
    if stats.mean_ms < SPARKLING_BELOW_MS {
        AuraShape::Sparkling
    } else if stats.mean_ms > FLOWING_ABOVE_MS {
        AuraShape::Flowing
    } else if stats.range_ms() > PULSING_RANGE_ABOVE_MS {
        AuraShape::Pulsing
    } else {
        AuraShape::Balanced
    }
}

/// Speed bucket from mean latency, independent of the shape thresholds
pub fn classify_speed(mean_ms: f64) -> AuraSpeed {
    SPEED_BOUNDS_MS
        .iter()
        .find(|(bound, _)| mean_ms < *bound)
        .map(|(_, speed)| *speed)
        .unwrap_or(AuraSpeed::Slow)
}

/// Aura for an empty questionnaire
pub fn default_aura() -> Aura {
    let mut aura = Aura::new(
        DEFAULT_TAGS.map(ColorTag::rgb),
        AuraShape::Balanced,
        AuraSpeed::Medium,
    );
    aura.tags = DEFAULT_TAGS.to_vec();
    aura
}

/// Derive an aura from an ordered answer list
///
/// Total: an empty list yields [`default_aura`]. The only non-determinism is
/// the third-color draw, which goes through `tie_break`.
pub fn derive<T: TieBreak + ?Sized>(answers: &[QuestionnaireAnswer], tie_break: &mut T) -> Aura {
    let stats = match LatencyStats::from_answers(answers) {
        Some(stats) => stats,
        None => {
            tracing::debug!("Empty questionnaire, using default aura");
            return default_aura();
        }
    };

    let tags = select_tags(answers, tie_break);
    let shape = classify_shape(&stats);
    let speed = classify_speed(stats.mean_ms);

    tracing::debug!(
        "Derived aura from {} answers: tags={:?}, mean={:.0}ms, range={}ms, shape={:?}, speed={:?}",
        answers.len(),
        tags,
        stats.mean_ms,
        stats.range_ms(),
        shape,
        speed
    );

    let mut aura = Aura::new(tags.map(ColorTag::rgb), shape, speed);
    aura.tags = tags.to_vec();
    aura
}

/// Stateless deriver that stamps each aura with its derivation time
#[derive(Debug, Clone, Copy, Default)]
pub struct AuraDeriver;

impl AuraDeriver {
    pub fn new() -> Self {
        Self
    }

    pub fn derive_with<T: TieBreak + ?Sized>(&self, answers: &[QuestionnaireAnswer], tie_break: &mut T) -> Aura {
        let mut aura = derive(answers, tie_break);
        aura.derived_at = Some(chrono::Utc::now());
        aura
    }

    /// Derive using the thread-local generator for tie-breaks
    pub fn derive(&self, answers: &[QuestionnaireAnswer]) -> Aura {
        self.derive_with(answers, &mut RandomTieBreak::thread_local())
    }
}
