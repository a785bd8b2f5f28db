use crate::core::filters::matches_criteria;
use crate::models::{FilterCriteria, MenuEntry, RECOMMENDATION_LIMIT};
use std::cmp::Ordering;

/// Result of a catalog run
#[derive(Debug)]
pub struct RecommendationResult {
    pub entries: Vec<MenuEntry>,
    /// Entries that survived every filter, before truncation
    pub matched: usize,
    pub total_candidates: usize,
}

/// Catalog recommender - filters a menu snapshot and keeps the best rated dishes
///
/// # Pipeline Stages
/// 1. Dietary exclusion
/// 2. Budget cap
/// 3. Stall amenities
/// 4. Cuisine / location
/// 5. Rank by dish rating, then stall rating
/// 6. Truncate
#[derive(Debug, Clone)]
pub struct CatalogFilterEngine {
    limit: usize,
}

impl CatalogFilterEngine {
    pub fn new() -> Self {
        Self {
            limit: RECOMMENDATION_LIMIT,
        }
    }

    /// Top rated entries matching the criteria, at most three
    ///
    /// Pure over its inputs: the catalog is not modified and the same
    /// arguments always give the same order.
    pub fn recommend(&self, catalog: &[MenuEntry], criteria: &FilterCriteria) -> Vec<MenuEntry> {
        self.run(catalog, criteria).entries
    }

    /// Same as [`recommend`](Self::recommend), keeping the pipeline counts
    pub fn run(&self, catalog: &[MenuEntry], criteria: &FilterCriteria) -> RecommendationResult {
        let total_candidates = catalog.len();

        let mut entries: Vec<MenuEntry> = catalog
            .iter()
            .filter(|entry| matches_criteria(entry, criteria))
            .cloned()
            .collect();

        let matched = entries.len();

        // Stable, so fully tied entries keep catalog order
        entries.sort_by(compare_ranked);
        entries.truncate(self.limit);

        tracing::trace!(
            "Catalog run: {} candidates, {} matched, {} returned",
            total_candidates,
            matched,
            entries.len()
        );

        RecommendationResult {
            entries,
            matched,
            total_candidates,
        }
    }
}

impl Default for CatalogFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Descending by dish rating, then by stall rating; missing ratings rank as zero
pub fn compare_ranked(a: &MenuEntry, b: &MenuEntry) -> Ordering {
    b.rank_rating()
        .total_cmp(&a.rank_rating())
        .then_with(|| b.stall.rank_rating().total_cmp(&a.stall.rank_rating()))
}
