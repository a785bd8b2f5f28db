//! Stall Algo - menu and peer recommendations for the hawker stall app
//!
//! The app keeps its data on a hosted backend; this crate holds the two
//! pieces of decision logic that sit on top of it:
//! - a catalog engine that filters menus by diet, budget, amenities and
//!   category and returns the three best rated dishes
//! - a peer ranker that orders other users by saved-menu overlap

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CatalogFilterEngine, PeerRanker, RecommendationResult};
pub use models::{Budget, FilterCriteria, FilterError, MenuEntry, SavedIds, StallSummary, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let engine = CatalogFilterEngine::default();
        assert!(engine.recommend(&[], &FilterCriteria::default()).is_empty());
    }
}
