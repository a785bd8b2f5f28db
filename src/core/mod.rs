// Core algorithm exports
pub mod engine;
pub mod filters;
pub mod peers;
pub mod similarity;

pub use engine::{CatalogFilterEngine, RecommendationResult};
pub use filters::{matches_amenities, matches_categories, matches_criteria, passes_dietary, within_budget};
pub use peers::PeerRanker;
pub use similarity::{shared_menus, similarity_score};
