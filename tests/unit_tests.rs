// Unit tests for Aura Match

use aura_match::core::{
    aura::{classify_shape, classify_speed, derive, LatencyStats, RandomTieBreak},
    color::{canonicalize, extract_hex_tokens, ColorCodec, FALLBACK_COLOR},
    distance::{calculate_bounding_box, haversine_distance},
    similarity::{color_similarity, SimilarityMatcher},
};
use aura_match::models::{
    Aura, AuraShape, AuraSpeed, ColorTag, GeoPoint, Location, QuestionnaireAnswer, RawColor, Rgb,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn answers(tags: &[ColorTag], latency_ms: u64) -> Vec<QuestionnaireAnswer> {
    tags.iter()
        .enumerate()
        .map(|(i, tag)| QuestionnaireAnswer::new(i as u32, *tag, latency_ms))
        .collect()
}

fn location(id: &str, color: &str) -> Location {
    Location::new(id, 40.7128, -74.0060, RawColor::from_text(color), "cafe", 1.0)
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_manhattan_to_brooklyn() {
    // Manhattan to Brooklyn is approximately 5-10 km
    let distance = haversine_distance(40.7580, -73.9855, 40.6782, -73.9442);
    assert!(distance > 5.0 && distance < 15.0);
}

#[test]
fn test_bounding_box_creation() {
    let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);

    assert!(bbox.min_lat < 40.7128);
    assert!(bbox.max_lat > 40.7128);
    assert!(bbox.min_lon < -74.0060);
    assert!(bbox.max_lon > -74.0060);
    assert!(bbox.contains(GeoPoint::new(40.7128, -74.0060)));

    // 20km / 111km per degree ≈ 0.18 degrees
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);
}

#[test]
fn test_similarity_identity_and_bounds() {
    let red = ColorTag::Red.rgb();
    assert_eq!(color_similarity(red, red), 1.0);
    assert_eq!(color_similarity(Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)), 0.0);

    for a in ColorTag::ALL {
        for b in ColorTag::ALL {
            let s = color_similarity(a.rgb(), b.rgb());
            assert!((0.0..=1.0).contains(&s));
            assert_eq!(s, color_similarity(b.rgb(), a.rgb()));
        }
    }
}

#[test]
fn test_canonicalize_returns_valid_hex_token() {
    for text in ["#3A7BD5", "background: #3A7BD5", "#3a7bd5 then #ZZZ", "rgba-ish #3A7BD5CC"] {
        assert_eq!(
            canonicalize(&RawColor::from_text(text)),
            vec![Rgb::new(0x3A, 0x7B, 0xD5)],
            "input {:?}",
            text
        );
    }

    // Bare digits are accepted only for an explicit hex value
    assert_eq!(canonicalize(&RawColor::Hex("3A7BD5".to_string())), vec![Rgb::new(0x3A, 0x7B, 0xD5)]);
}

#[test]
fn test_canonicalize_never_empty() {
    for raw in [
        RawColor::Missing,
        RawColor::from_text(""),
        RawColor::from_text("#GGGGGG"),
        RawColor::from_text("facade"),
        RawColor::Tagged("decade".to_string()),
        RawColor::from_text("no colors here"),
        RawColor::Slots(vec!["junk".to_string(), "#XYZ".to_string()]),
    ] {
        assert_eq!(canonicalize(&raw), vec![FALLBACK_COLOR], "input {:?}", raw);
    }
}

#[test]
fn test_hex_tokens_keep_textual_order() {
    let tokens = extract_hex_tokens("linear-gradient(#00FF00, #F00 50%, #0000ff)");
    assert_eq!(
        tokens,
        vec![Rgb::new(0, 255, 0), Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]
    );
}

#[test]
fn test_codec_is_idempotent_and_memoized() {
    let codec = ColorCodec::new(100);
    let raw = RawColor::from_text("#FF0000 #00FF00");

    let first = codec.canonicalize(&raw);
    let second = codec.canonicalize(&raw);

    assert_eq!(first, second);
    assert_eq!(first, canonicalize(&raw));
    assert_eq!(codec.entry_count(), 1);
}

#[test]
fn test_score_symmetric_under_color_permutation() {
    let matcher = SimilarityMatcher::default();
    let red = ColorTag::Red.rgb();
    let blue = ColorTag::Blue.rgb();
    let gold = ColorTag::Gold.rgb();

    let aura_a = Aura::new([red, blue, gold], AuraShape::Balanced, AuraSpeed::Medium);
    let aura_b = Aura::new([gold, red, blue], AuraShape::Balanced, AuraSpeed::Medium);

    let loc_a = location("1", "#FF0000, #0000FF");
    let loc_b = location("1", "#0000FF, #FF0000");

    let base = matcher.score(&aura_a, &loc_a);
    for (aura, loc) in [(&aura_a, &loc_b), (&aura_b, &loc_a), (&aura_b, &loc_b)] {
        let result = matcher.score(aura, loc);
        assert!((result.score - base.score).abs() < 1e-9);
        assert_eq!(result.matched_color_count, base.matched_color_count);
        assert_eq!(result.strict, base.strict);
    }

    assert_eq!(matcher.score(&aura_a, &loc_a), base);
}

#[test]
fn test_derive_always_returns_three_colors() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let len = rng.gen_range(1..20);
        let answers: Vec<QuestionnaireAnswer> = (0..len)
            .map(|i| {
                let tag = ColorTag::ALL[rng.gen_range(0..ColorTag::ALL.len())];
                QuestionnaireAnswer::new(i, tag, rng.gen_range(0..10_000))
            })
            .collect();

        let aura = derive(&answers, &mut RandomTieBreak::new(StdRng::seed_from_u64(len as u64)));

        assert_eq!(aura.tags.len(), 3);
        assert_eq!(aura.colors(), [aura.tags[0].rgb(), aura.tags[1].rgb(), aura.tags[2].rgb()]);
        assert_ne!(aura.tags[0], aura.tags[1]);
        assert_ne!(aura.tags[1], aura.tags[2]);
        assert_ne!(aura.tags[0], aura.tags[2]);
    }
}

#[test]
fn test_unique_leaders_are_deterministic() {
    let mut tags = vec![ColorTag::Gold; 5];
    tags.extend([ColorTag::Cyan; 3]);
    tags.extend([ColorTag::Red, ColorTag::Blue]);

    for seed in 0..20 {
        let aura = derive(&answers(&tags, 2500), &mut RandomTieBreak::new(StdRng::seed_from_u64(seed)));
        assert_eq!(aura.color1, ColorTag::Gold.rgb());
        assert_eq!(aura.color2, ColorTag::Cyan.rgb());
    }
}

#[test]
fn test_latency_thresholds() {
    let shape = |latencies: &[u64]| {
        let answers: Vec<QuestionnaireAnswer> = latencies
            .iter()
            .enumerate()
            .map(|(i, ms)| QuestionnaireAnswer::new(i as u32, ColorTag::Red, *ms))
            .collect();
        classify_shape(&LatencyStats::from_answers(&answers).unwrap())
    };

    assert_eq!(shape(&[1999]), AuraShape::Sparkling);
    assert_eq!(shape(&[2000]), AuraShape::Balanced);
    assert_eq!(shape(&[3500]), AuraShape::Balanced);
    assert_eq!(shape(&[3501]), AuraShape::Flowing);
    assert_eq!(shape(&[1000, 4000]), AuraShape::Balanced);
    assert_eq!(shape(&[999, 4001]), AuraShape::Pulsing);

    assert_eq!(classify_speed(1499.0), AuraSpeed::Fast);
    assert_eq!(classify_speed(1500.0), AuraSpeed::MediumFast);
    assert_eq!(classify_speed(8000.0), AuraSpeed::Slow);
}
