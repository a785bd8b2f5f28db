use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Budget, FilterCriteria, FilterError};

/// Request to recommend menu entries
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendMenusRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub excluded_tags: Vec<String>,
    #[serde(default)]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub require_air_con: bool,
    #[serde(default)]
    pub require_halal: bool,
    #[serde(default)]
    pub require_vegetarian: bool,
    #[serde(default)]
    pub cuisine_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default = "default_true")]
    pub apply_dietary_restrictions: bool,
}

fn default_true() -> bool {
    true
}

impl RecommendMenusRequest {
    /// Build filter criteria, merging in the caller's declared restrictions
    pub fn to_criteria(&self, restrictions: &[String]) -> Result<FilterCriteria, FilterError> {
        let max_budget = self.max_budget.map(Budget::new).transpose()?;

        let mut excluded_tags: std::collections::BTreeSet<String> =
            self.excluded_tags.iter().cloned().collect();
        if self.apply_dietary_restrictions {
            excluded_tags.extend(restrictions.iter().cloned());
        }

        Ok(FilterCriteria {
            excluded_tags,
            max_budget,
            require_air_con: self.require_air_con,
            require_halal: self.require_halal,
            require_vegetarian: self.require_vegetarian,
            cuisine_id: self.cuisine_id.clone().filter(|id| !id.is_empty()),
            location_id: self.location_id.clone().filter(|id| !id.is_empty()),
        })
    }
}

/// Request to recommend other users to follow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendUsersRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(alias = "exclude_user_ids", default)]
    pub exclude_user_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_criteria_merges_restrictions() {
        let req = RecommendMenusRequest {
            excluded_tags: vec!["SHELLFISH".to_string()],
            apply_dietary_restrictions: true,
            ..Default::default()
        };

        let criteria = req.to_criteria(&["GLUTEN".to_string()]).unwrap();
        assert!(criteria.excluded_tags.contains("SHELLFISH"));
        assert!(criteria.excluded_tags.contains("GLUTEN"));
    }

    #[test]
    fn test_to_criteria_skips_restrictions_when_disabled() {
        let req = RecommendMenusRequest {
            apply_dietary_restrictions: false,
            ..Default::default()
        };

        let criteria = req.to_criteria(&["GLUTEN".to_string()]).unwrap();
        assert!(criteria.excluded_tags.is_empty());
        assert!(criteria.max_budget.is_none());
    }

    #[test]
    fn test_to_criteria_rejects_negative_budget() {
        let req = RecommendMenusRequest {
            max_budget: Some(-2.0),
            ..Default::default()
        };

        assert!(matches!(req.to_criteria(&[]), Err(FilterError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_category_treated_as_unset() {
        let req = RecommendMenusRequest {
            cuisine_id: Some(String::new()),
            ..Default::default()
        };

        assert!(req.to_criteria(&[]).unwrap().cuisine_id.is_none());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: RecommendMenusRequest = serde_json::from_str(r#"{"userId": "u1"}"#).unwrap();
        assert!(req.apply_dietary_restrictions);
        assert_eq!(req.user_id.as_deref(), Some("u1"));
        assert!(req.max_budget.is_none());
    }
}
