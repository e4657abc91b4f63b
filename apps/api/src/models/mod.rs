pub mod recommendation;

pub use recommendation::{PredictResponse, ProfileInput, Recommendation, RoadmapPhase};
