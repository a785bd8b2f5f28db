// Unit tests for Stall Algo

use stall_algo::core::{
    filters::{matches_amenities, matches_categories, matches_criteria, passes_dietary, within_budget},
    similarity::similarity_score,
};
use stall_algo::models::{Budget, FilterCriteria, MenuEntry, SavedIds, StallSummary, UserProfile};

fn create_entry(tags: &[&str], price: f64) -> MenuEntry {
    MenuEntry {
        id: "m1".to_string(),
        name: Some("Laksa".to_string()),
        price,
        rating: Some(4.1),
        dietary_tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        image_url: None,
        stall: StallSummary {
            id: "s1".to_string(),
            name: Some("Sungei Road Laksa".to_string()),
            has_air_con: Some(false),
            is_halal: Some(true),
            is_vegetarian: Some(false),
            rating: Some(4.4),
            cuisine_id: Some("peranakan".to_string()),
            location_id: Some("jalan_berseh".to_string()),
        },
    }
}

#[test]
fn test_vegetarian_tag_excluded_regardless_of_rating() {
    let mut entry = create_entry(&["Vegetarian"], 3.0);
    entry.rating = Some(5.0);

    let criteria = FilterCriteria {
        excluded_tags: ["Vegetarian".to_string()].into_iter().collect(),
        ..Default::default()
    };

    assert!(!passes_dietary(&entry, &criteria));
    assert!(!matches_criteria(&entry, &criteria));
}

#[test]
fn test_tag_match_is_case_sensitive() {
    let entry = create_entry(&["gluten"], 3.0);
    let criteria = FilterCriteria {
        excluded_tags: ["GLUTEN".to_string()].into_iter().collect(),
        ..Default::default()
    };

    assert!(passes_dietary(&entry, &criteria));
}

#[test]
fn test_budget_filter() {
    let entry = create_entry(&[], 6.5);

    let unset = FilterCriteria::default();
    assert!(within_budget(&entry, &unset));

    let tight = FilterCriteria {
        max_budget: Some(Budget::new(6.0).unwrap()),
        ..Default::default()
    };
    assert!(!within_budget(&entry, &tight));

    let exact = FilterCriteria {
        max_budget: Some(Budget::new(6.5).unwrap()),
        ..Default::default()
    };
    assert!(within_budget(&entry, &exact));
}

#[test]
fn test_amenity_filters_are_conjunctive() {
    let entry = create_entry(&[], 3.0);

    let halal_only = FilterCriteria {
        require_halal: true,
        ..Default::default()
    };
    assert!(matches_amenities(&entry, &halal_only));

    let halal_and_air_con = FilterCriteria {
        require_halal: true,
        require_air_con: true,
        ..Default::default()
    };
    assert!(!matches_amenities(&entry, &halal_and_air_con));
}

#[test]
fn test_category_filters() {
    let entry = create_entry(&[], 3.0);

    let wrong_cuisine = FilterCriteria {
        cuisine_id: Some("western".to_string()),
        ..Default::default()
    };
    assert!(!matches_categories(&entry, &wrong_cuisine));

    let both = FilterCriteria {
        cuisine_id: Some("peranakan".to_string()),
        location_id: Some("jalan_berseh".to_string()),
        ..Default::default()
    };
    assert!(matches_categories(&entry, &both));
}

#[test]
fn test_stall_without_category_fails_category_filter() {
    let mut entry = create_entry(&[], 3.0);
    entry.stall.cuisine_id = None;

    let criteria = FilterCriteria {
        cuisine_id: Some("peranakan".to_string()),
        ..Default::default()
    };

    assert!(!matches_categories(&entry, &criteria));
}

#[test]
fn test_similarity_with_scalar_saved_ids() {
    let caller: UserProfile =
        serde_json::from_str(r#"{"id": "me", "saved_menu_ids": [1, 2, 3]}"#).unwrap();
    let peer: UserProfile = serde_json::from_str(r#"{"id": "p", "saved_menu_ids": 2}"#).unwrap();

    assert_eq!(similarity_score(&caller.saved_menu_ids, &peer), 1);
}

#[test]
fn test_similarity_zero_for_empty_sets() {
    let peer: UserProfile = serde_json::from_str(r#"{"id": "p", "saved_menu_ids": null}"#).unwrap();

    assert_eq!(similarity_score(&SavedIds::new(), &peer), 0);
}
