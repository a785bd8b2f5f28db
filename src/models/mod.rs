// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Budget, FilterCriteria, FilterError, MenuEntry, SavedIds, ScoredPeer, StallSummary,
    UserProfile, RECOMMENDATION_LIMIT,
};
pub use requests::{RecommendMenusRequest, RecommendUsersRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MenuRecommendation, PeerRecommendation, RecommendMenusResponse,
    RecommendUsersResponse,
};
