use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;
use crate::core::{CatalogFilterEngine, PeerRanker};
use crate::models::{
    ErrorResponse, HealthResponse, MenuRecommendation, PeerRecommendation, RecommendMenusRequest,
    RecommendMenusResponse, RecommendUsersRequest, RecommendUsersResponse, SavedIds, UserProfile,
};
use crate::services::{BackendError, Snapshot, SnapshotStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotStore,
    pub engine: CatalogFilterEngine,
    pub ranker: PeerRanker,
}

/// Configure all recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/menus/recommend", web::post().to(recommend_menus))
        .route("/users/recommend", web::post().to(recommend_users))
        .route("/snapshots/refresh", web::post().to(refresh_snapshots));
}

fn validation_error(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

/// Map a backend failure onto a response; unknown users are 404, the rest 502
fn backend_error(context: &str, err: BackendError) -> HttpResponse {
    match err {
        BackendError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message,
            status_code: 404,
        }),
        other => HttpResponse::BadGateway().json(ErrorResponse {
            error: context.to_string(),
            message: other.to_string(),
            status_code: 502,
        }),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let cache = state.snapshots.cache().stats();
    tracing::debug!(
        "Health check, L1 cache holds {} snapshot(s), shared tier: {}",
        cache.l1_entries,
        cache.shared
    );

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommend menu entries
///
/// POST /api/v1/menus/recommend
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "excludedTags": ["GLUTEN"],
///   "maxBudget": 6.5,
///   "requireAirCon": false,
///   "requireHalal": true,
///   "requireVegetarian": false,
///   "cuisineId": "string",
///   "locationId": "string",
///   "applyDietaryRestrictions": true
/// }
/// ```
async fn recommend_menus(
    state: web::Data<AppState>,
    req: web::Json<RecommendMenusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend_menus request: {:?}", errors);
        return validation_error(errors.to_string());
    }

    // Restrictions come from the caller's profile when one is named
    let restrictions = match (&req.user_id, req.apply_dietary_restrictions) {
        (Some(user_id), true) => match state.snapshots.profile(user_id).await {
            Ok(profile) => profile.restrictions().to_vec(),
            Err(e) => {
                tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
                return backend_error("profile_fetch_failed", e);
            }
        },
        _ => Vec::new(),
    };

    let criteria = match req.to_criteria(&restrictions) {
        Ok(criteria) => criteria,
        Err(e) => {
            tracing::info!("Rejected filter criteria: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_argument".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    let catalog = match state.snapshots.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to load catalog: {}", e);
            return backend_error("catalog_fetch_failed", e);
        }
    };

    let result = state.engine.run(&catalog, &criteria);

    tracing::info!(
        "Returning {} menu recommendations ({} matched of {} entries, {} tags excluded)",
        result.entries.len(),
        result.matched,
        result.total_candidates,
        criteria.excluded_tags.len()
    );

    HttpResponse::Ok().json(RecommendMenusResponse {
        entries: result
            .entries
            .into_iter()
            .map(MenuRecommendation::from)
            .collect(),
        matched: result.matched,
        total_candidates: result.total_candidates,
    })
}

/// Recommend users with similar saved menus
///
/// POST /api/v1/users/recommend
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "excludeUserIds": ["string"]
/// }
/// ```
async fn recommend_users(
    state: web::Data<AppState>,
    req: web::Json<RecommendUsersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend_users request: {:?}", errors);
        return validation_error(errors.to_string());
    }

    let user_id = &req.user_id;

    let caller = match state.snapshots.profile(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return backend_error("profile_fetch_failed", e);
        }
    };

    let roster = match state.snapshots.roster().await {
        Ok(roster) => roster,
        Err(e) => {
            tracing::error!("Failed to load profile roster: {}", e);
            return backend_error("roster_fetch_failed", e);
        }
    };

    let exclude = peer_exclusions(&caller, &req.exclude_user_ids);

    tracing::debug!("Excluding {} users for {}", exclude.len(), user_id);

    let peers = state
        .ranker
        .rank_scored(&caller.id, &caller.saved_menu_ids, &roster, &exclude);

    tracing::info!(
        "Returning {} peer recommendations for user {} (roster of {})",
        peers.len(),
        user_id,
        roster.len()
    );

    HttpResponse::Ok().json(RecommendUsersResponse {
        total: peers.len(),
        peers: peers.into_iter().map(PeerRecommendation::from).collect(),
    })
}

/// Already followed users plus whatever the client hides on its side
fn peer_exclusions(caller: &UserProfile, extra: &[String]) -> SavedIds {
    let mut exclude = caller.saved_user_ids.clone();
    exclude.extend(extra.iter().filter(|id| !id.is_empty()).cloned());
    exclude
}

#[derive(Debug, Deserialize)]
struct RefreshQuery {
    scope: Option<String>,
}

/// Drop cached snapshots
///
/// POST /api/v1/snapshots/refresh?scope=catalog|all
async fn refresh_snapshots(
    state: web::Data<AppState>,
    query: web::Query<RefreshQuery>,
) -> impl Responder {
    let scope = query.scope.as_deref().unwrap_or("catalog");

    let snapshots: &[Snapshot] = match scope {
        "catalog" => &[Snapshot::Catalog],
        "all" => &Snapshot::ALL,
        other => {
            return validation_error(format!("Unknown scope '{}', expected catalog or all", other));
        }
    };

    match state.snapshots.refresh(snapshots).await {
        Ok(()) => {
            tracing::info!("Refreshed snapshot scope: {}", scope);
            HttpResponse::Ok().json(serde_json::json!({
                "refreshed": scope,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to refresh snapshots ({}): {}", scope, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to refresh snapshots".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
