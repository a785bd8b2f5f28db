use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Number of menu recommendations returned by the catalog engine
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Errors raised when a caller hands the engine unusable input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A single dish row with its parent stall embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(alias = "dietaryTags", default)]
    pub dietary_tags: Option<Vec<String>>,
    #[serde(alias = "imageUrl", default)]
    pub image_url: Option<String>,
    pub stall: StallSummary,
}

impl MenuEntry {
    /// Dietary tags, empty when the column is null
    pub fn tags(&self) -> &[String] {
        self.dietary_tags.as_deref().unwrap_or(&[])
    }

    /// Rating used for ranking; a missing rating ranks as zero
    pub fn rank_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Stall attributes the filters look at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StallSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "hasAirCon", default)]
    pub has_air_con: Option<bool>,
    #[serde(alias = "isHalal", default)]
    pub is_halal: Option<bool>,
    #[serde(alias = "isVegetarian", default)]
    pub is_vegetarian: Option<bool>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(alias = "cuisineId", default, deserialize_with = "deserialize_opt_id")]
    pub cuisine_id: Option<String>,
    #[serde(alias = "locationId", default, deserialize_with = "deserialize_opt_id")]
    pub location_id: Option<String>,
}

impl StallSummary {
    pub fn air_con(&self) -> bool {
        self.has_air_con.unwrap_or(false)
    }

    pub fn halal(&self) -> bool {
        self.is_halal.unwrap_or(false)
    }

    pub fn vegetarian(&self) -> bool {
        self.is_vegetarian.unwrap_or(false)
    }

    pub fn rank_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Spending cap for a filter run
///
/// Always finite and non-negative; anything else is rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Budget(f64);

impl Budget {
    pub fn new(value: f64) -> Result<Self, FilterError> {
        if !value.is_finite() {
            return Err(FilterError::InvalidArgument(format!(
                "budget must be a finite number, got {}",
                value
            )));
        }
        if value < 0.0 {
            return Err(FilterError::InvalidArgument(format!(
                "budget must not be negative, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Budget {
    type Error = FilterError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Budget::new(value)
    }
}

impl From<Budget> for f64 {
    fn from(budget: Budget) -> Self {
        budget.0
    }
}

/// Caller supplied filter selection, built fresh for every run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub excluded_tags: BTreeSet<String>,
    #[serde(default)]
    pub max_budget: Option<Budget>,
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
}

/// Set of saved ids, normalized from the storage format
///
/// The profiles table stores saved ids either as an array or as a single
/// scalar, and ids show up as strings or numbers. All of those collapse into
/// one ordered set of strings here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SavedIds(BTreeSet<String>);

impl SavedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Number of ids present in both sets
    pub fn overlap(&self, other: &SavedIds) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().filter(|id| large.contains(id)).count()
    }
}

impl<S: Into<String>> FromIterator<S> for SavedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Extend<String> for SavedIds {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIds {
    One(RawId),
    Many(Vec<Option<RawId>>),
}

/// Primary keys and foreign keys come back as numbers on integer-keyed tables
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

impl<'de> Deserialize<'de> for SavedIds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = match Option::<RawIds>::deserialize(deserializer)? {
            None => SavedIds::new(),
            Some(RawIds::One(id)) => std::iter::once(id.into_string()).collect(),
            Some(RawIds::Many(ids)) => ids.into_iter().flatten().map(RawId::into_string).collect(),
        };
        Ok(ids)
    }
}

/// User row as read from the profiles table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(alias = "savedMenuIds", alias = "saved_menus", default)]
    pub saved_menu_ids: SavedIds,
    #[serde(alias = "savedUserIds", alias = "saved_users", default)]
    pub saved_user_ids: SavedIds,
    #[serde(alias = "dietaryRestrictions", default)]
    pub dietary_restrictions: Option<Vec<String>>,
}

impl UserProfile {
    /// Declared dietary restrictions, empty when the column is null
    pub fn restrictions(&self) -> &[String] {
        self.dietary_restrictions.as_deref().unwrap_or(&[])
    }
}

/// Peer with the number of saved menus it shares with the caller
#[derive(Debug, Clone)]
pub struct ScoredPeer {
    pub profile: UserProfile,
    pub similarity: usize,
    pub shared_menu_ids: Vec<String>,
}
