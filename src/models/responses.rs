use serde::{Deserialize, Serialize};
use crate::models::domain::{MenuEntry, ScoredPeer};

/// Menu entry as shown on the recommendation screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecommendation {
    pub menu_id: String,
    pub name: Option<String>,
    pub price: f64,
    /// `None` means the dish has no rating yet, which is not the same as zero
    pub rating: Option<f64>,
    pub dietary_tags: Vec<String>,
    pub image_url: Option<String>,
    pub stall_id: String,
    pub stall_name: Option<String>,
    pub stall_rating: Option<f64>,
}

impl From<MenuEntry> for MenuRecommendation {
    fn from(entry: MenuEntry) -> Self {
        Self {
            menu_id: entry.id,
            name: entry.name,
            price: entry.price,
            rating: entry.rating,
            dietary_tags: entry.dietary_tags.unwrap_or_default(),
            image_url: entry.image_url,
            stall_id: entry.stall.id,
            stall_name: entry.stall.name,
            stall_rating: entry.stall.rating,
        }
    }
}

/// Response for the menu recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendMenusResponse {
    pub entries: Vec<MenuRecommendation>,
    pub matched: usize,
    pub total_candidates: usize,
}

/// Peer as shown in the "recommended users" list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecommendation {
    pub user_id: String,
    pub username: Option<String>,
    pub similarity: usize,
    pub shared_menu_ids: Vec<String>,
    pub saved_menu_count: usize,
}

impl From<ScoredPeer> for PeerRecommendation {
    fn from(peer: ScoredPeer) -> Self {
        Self {
            saved_menu_count: peer.profile.saved_menu_ids.len(),
            user_id: peer.profile.id,
            username: peer.profile.username,
            similarity: peer.similarity,
            shared_menu_ids: peer.shared_menu_ids,
        }
    }
}

/// Response for the peer recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendUsersResponse {
    pub peers: Vec<PeerRecommendation>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
