use std::collections::HashSet;
use std::f64::consts::PI;

use geo::{Centroid, MultiPoint, Point};
use serde::Deserialize;

use crate::core::distance::{calculate_bounding_box, haversine_distance, pixel_distance, pixels_per_degree};
use crate::core::similarity::SimilarityMatcher;
use crate::models::{ActiveFilter, BoundingBox, GeoPoint, Location, Marker, Viewport};

/// Marker cap for zooms at or above `min_zoom`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ZoomBand {
    pub min_zoom: f64,
    pub max_count: usize,
}

/// Tuning for viewport selection and overlap resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPolicy {
    /// Radius around the last known position when bounds are unavailable
    pub fallback_radius_km: f64,
    pub zoom_bands: Vec<ZoomBand>,
    /// Cap below the lowest band
    pub default_max_count: usize,
    /// Markers closer than this on screen are treated as overlapping
    pub overlap_pixels: f64,
    /// Screen gap between neighbouring markers after spreading; kept above
    /// `overlap_pixels` so spread markers no longer overlap
    pub spread_gap_pixels: f64,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            fallback_radius_km: 5.0,
            zoom_bands: default_zoom_bands(),
            default_max_count: 180,
            overlap_pixels: 20.0,
            spread_gap_pixels: 24.0,
        }
    }
}

/// Wider zoom (smaller number) gets the smaller cap
pub fn default_zoom_bands() -> Vec<ZoomBand> {
    vec![
        ZoomBand {
            min_zoom: 15.0,
            max_count: 200,
        },
        ZoomBand {
            min_zoom: 13.0,
            max_count: 190,
        },
    ]
}

/// Spatial restriction resolved from a viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    Bounds(BoundingBox),
    /// Distance-based fallback: box pre-filter refined by Haversine
    Around {
        center: GeoPoint,
        bbox: BoundingBox,
        radius_km: f64,
    },
}

impl Region {
    #[inline]
    pub fn contains(&self, point: GeoPoint) -> bool {
        match self {
            Region::Bounds(bbox) => bbox.contains(point),
            Region::Around { center, bbox, radius_km } => {
                bbox.contains(point)
                    && haversine_distance(center.latitude, center.longitude, point.latitude, point.longitude)
                        <= *radius_km
            }
        }
    }
}

/// Picks the markers to draw for a viewport
///
/// # Pipeline Stages
/// 1. Active filter (place type or aura similarity)
/// 2. Viewport bounds, or distance fallback around the last known position
/// 3. Importance ranking
/// 4. Cap by count
/// 5. Overlap resolution
///
/// Holds no mutable state; callers are expected to debounce rapid viewport changes.
#[derive(Debug, Clone)]
pub struct ViewportSelector {
    policy: ViewportPolicy,
    matcher: SimilarityMatcher,
}

impl ViewportSelector {
    pub fn new(policy: ViewportPolicy, matcher: SimilarityMatcher) -> Self {
        let mut policy = policy;
        policy
            .zoom_bands
            .sort_by(|a, b| b.min_zoom.total_cmp(&a.min_zoom));
        Self { policy, matcher }
    }

    pub fn policy(&self) -> &ViewportPolicy {
        &self.policy
    }

    pub fn max_count_for_zoom(&self, zoom: f64) -> usize {
        self.policy
            .zoom_bands
            .iter()
            .find(|band| zoom >= band.min_zoom)
            .map(|band| band.max_count)
            .unwrap_or(self.policy.default_max_count)
    }

    /// Stage 1: keep locations passing the active filter
    pub fn apply_filter<'a>(&self, locations: &'a [Location], filter: &ActiveFilter) -> Vec<&'a Location> {
        match filter {
            ActiveFilter::All => locations.iter().collect(),
            ActiveFilter::PlaceType { place_type } => locations
                .iter()
                .filter(|location| location.place_type.eq_ignore_ascii_case(place_type))
                .collect(),
            ActiveFilter::AuraMatch { aura } => {
                let outcome = self.matcher.match_locations(aura, locations);
                let ids: HashSet<&str> = outcome
                    .matches
                    .iter()
                    .map(|result| result.location_id.as_str())
                    .collect();
                locations
                    .iter()
                    .filter(|location| ids.contains(location.id.as_str()))
                    .collect()
            }
        }
    }

    /// Stage 2: viewport bounds when usable, else a box around the last known position
    pub fn region(&self, viewport: &Viewport) -> Option<Region> {
        if let Some(bounds) = viewport.bounds.filter(BoundingBox::is_valid) {
            return Some(Region::Bounds(bounds));
        }

        viewport.last_known_position.map(|center| {
            let radius_km = self.policy.fallback_radius_km;
            Region::Around {
                center,
                bbox: calculate_bounding_box(center.latitude, center.longitude, radius_km),
                radius_km,
            }
        })
    }

    /// Select, rank, cap and de-overlap the markers for one viewport
    pub fn select<'a>(
        &self,
        locations: &'a [Location],
        viewport: &Viewport,
        filter: &ActiveFilter,
        max_count: usize,
    ) -> Vec<Marker<'a>> {
        if locations.is_empty() {
            return Vec::new();
        }

        let mut selected = self.apply_filter(locations, filter);
        let after_filter = selected.len();

        match self.region(viewport) {
            Some(region) => selected.retain(|location| region.contains(location.position())),
            None => tracing::debug!("No viewport bounds or last known position, skipping spatial filter"),
        }

        // Stage 3: importance descending, id for stable ties
        selected.sort_by(|a, b| {
            b.importance_score
                .total_cmp(&a.importance_score)
                .then_with(|| a.id.cmp(&b.id))
        });

        // Stage 4
        selected.truncate(max_count);

        tracing::debug!(
            "Viewport selection: {} locations, {} after filter, {} selected (cap {})",
            locations.len(),
            after_filter,
            selected.len(),
            max_count
        );

        self.resolve_overlaps(&selected, viewport.zoom)
    }

    /// [`select`](Self::select) with the cap chosen by zoom band
    pub fn select_for_viewport<'a>(
        &self,
        locations: &'a [Location],
        viewport: &Viewport,
        filter: &ActiveFilter,
    ) -> Vec<Marker<'a>> {
        self.select(locations, viewport, filter, self.max_count_for_zoom(viewport.zoom))
    }

    /// Screen radius that leaves `spread_gap_pixels` between neighbours in a
    /// cluster of `count` markers
    pub fn spread_radius_px(&self, count: usize) -> f64 {
        let half_angle = PI / count.max(2) as f64;
        self.policy.spread_gap_pixels / (2.0 * half_angle.sin())
    }

    /// Stage 5: spread markers that would draw on top of each other evenly on
    /// a circle around their centroid. Output order matches input order and the
    /// locations' own coordinates are left untouched.
    pub fn resolve_overlaps<'a>(&self, locations: &[&'a Location], zoom: f64) -> Vec<Marker<'a>> {
        let mut clusters: Vec<Vec<usize>> = Vec::new();

        for (index, location) in locations.iter().enumerate() {
            let position = location.position();
            let existing = clusters.iter_mut().find(|members| {
                let anchor = locations[members[0]].position();
                pixel_distance(anchor, position, zoom) < self.policy.overlap_pixels
            });

            match existing {
                Some(members) => members.push(index),
                None => clusters.push(vec![index]),
            }
        }

        let mut markers: Vec<Marker<'a>> = locations
            .iter()
            .map(|location| Marker {
                location: *location,
                position: location.position(),
                displaced: false,
            })
            .collect();

        for members in clusters.iter().filter(|members| members.len() > 1) {
            let points: MultiPoint<f64> = members
                .iter()
                .map(|&i| Point::from(locations[i].position()))
                .collect::<Vec<_>>()
                .into();
            let Some(centroid) = points.centroid() else {
                continue;
            };

            let count = members.len() as f64;
            let radius_deg = self.spread_radius_px(members.len()) / pixels_per_degree(zoom);
            let lat_scale = centroid.y().to_radians().cos().abs();

            for (slot, &i) in members.iter().enumerate() {
                let angle = 2.0 * PI * slot as f64 / count;
                markers[i].position = GeoPoint::new(
                    centroid.y() + radius_deg * lat_scale * angle.cos(),
                    centroid.x() + radius_deg * angle.sin(),
                );
                markers[i].displaced = true;
            }
        }

        markers
    }
}

impl Default for ViewportSelector {
    fn default() -> Self {
        Self::new(ViewportPolicy::default(), SimilarityMatcher::default())
    }
}
