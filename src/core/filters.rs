use crate::models::{FilterCriteria, MenuEntry};

/// Check that none of the entry's dietary tags is excluded
///
/// Stage 1 of the catalog pipeline. An entry without tags always passes.
#[inline]
pub fn passes_dietary(entry: &MenuEntry, criteria: &FilterCriteria) -> bool {
    if criteria.excluded_tags.is_empty() {
        return true;
    }

    !entry
        .tags()
        .iter()
        .any(|tag| criteria.excluded_tags.contains(tag))
}

/// Check the entry price against the budget cap, if one is set
#[inline]
pub fn within_budget(entry: &MenuEntry, criteria: &FilterCriteria) -> bool {
    match criteria.max_budget {
        Some(budget) => entry.price <= budget.value(),
        None => true,
    }
}

/// Check the stall amenity toggles
///
/// Each active toggle must be satisfied; inactive toggles are ignored.
#[inline]
pub fn matches_amenities(entry: &MenuEntry, criteria: &FilterCriteria) -> bool {
    let stall = &entry.stall;

    if criteria.require_air_con && !stall.air_con() {
        return false;
    }

    if criteria.require_halal && !stall.halal() {
        return false;
    }

    if criteria.require_vegetarian && !stall.vegetarian() {
        return false;
    }

    true
}

/// Check the cuisine and location selections
#[inline]
pub fn matches_categories(entry: &MenuEntry, criteria: &FilterCriteria) -> bool {
    if let Some(cuisine_id) = &criteria.cuisine_id {
        if entry.stall.cuisine_id.as_ref() != Some(cuisine_id) {
            return false;
        }
    }

    if let Some(location_id) = &criteria.location_id {
        if entry.stall.location_id.as_ref() != Some(location_id) {
            return false;
        }
    }

    true
}

/// All catalog filters, applied conjunctively
#[inline]
pub fn matches_criteria(entry: &MenuEntry, criteria: &FilterCriteria) -> bool {
    passes_dietary(entry, criteria)
        && within_budget(entry, criteria)
        && matches_amenities(entry, criteria)
        && matches_categories(entry, criteria)
}
