// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ActiveFilter, Aura, AuraShape, AuraSpeed, BoundingBox, ColorFields, ColorTag, ComboBonus, GeoPoint, Location,
    LocationRecord, Marker, MatchResult, MatchWeights, NestedAura, QuestionnaireAnswer, RawColor, RecordId, Rgb,
    TagRecord, Viewport,
};
pub use requests::{CanonicalizeRequest, DeriveAuraRequest, MatchLocationsRequest, SelectLocationsRequest};
pub use responses::{
    CanonicalizeResponse, ErrorResponse, HealthResponse, MatchLocationsResponse, SelectLocationsResponse,
};
