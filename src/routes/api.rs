use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::error::ServiceError;
use crate::models::{
    BlockRequest, CandidateView, CandidatesResponse, FriendZoneRequest, GracefulExitRequest,
    HealthResponse, PickViewedRequest, RespondRequest, SwipeRequest, SwipeResponse, UndoRequest,
    UndoResponse, UnmatchRequest, UserQuery,
};
use crate::services::{
    CacheKey, CacheManager, CandidateService, DailyService, MatchingService, RelationshipService,
    UndoService,
};
use crate::storage::{HealthCheck, MatchStore, NotificationStore, Store};

/// Application state shared across all handlers
pub struct AppState<S: Store> {
    pub store: Arc<S>,
    pub matching: MatchingService<S>,
    pub undo: UndoService<S>,
    pub relationships: RelationshipService<S>,
    pub daily: DailyService<S>,
    pub candidates: CandidateService<S>,
    /// Absent when Redis is unreachable; candidate reads fall through.
    pub cache: Option<Arc<CacheManager>>,
    pub default_candidate_limit: usize,
    pub max_candidate_limit: usize,
}

/// Health check endpoint
pub async fn health<S: Store>(state: web::Data<AppState<S>>) -> HttpResponse {
    let status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(_) => "degraded",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Record a swipe; responds with the match when one was created.
pub async fn record_swipe<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ServiceError> {
    let outcome = state
        .matching
        .swipe(req.user_id, req.target_user_id, req.direction)
        .await?;

    if let Some(cache) = &state.cache {
        cache.invalidate_seeker(req.user_id).await;
    }

    Ok(HttpResponse::Ok().json(SwipeResponse::from(outcome)))
}

/// Undo the caller's most recent swipe within the undo window.
pub async fn undo_swipe<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<UndoRequest>,
) -> Result<HttpResponse, ServiceError> {
    let outcome = state.undo.undo(req.user_id).await?;

    if let Some(cache) = &state.cache {
        cache.invalidate_seeker(req.user_id).await;
    }

    Ok(HttpResponse::Ok().json(UndoResponse {
        undone_direction: outcome.direction,
        match_removed: outcome.match_removed,
    }))
}

/// Browse viable candidates, nearest first.
pub async fn list_candidates<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    query
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let limit = query
        .limit
        .map(usize::from)
        .unwrap_or(state.default_candidate_limit)
        .min(state.max_candidate_limit);

    let key = CacheKey::candidates(query.user_id);
    if let Some(cache) = &state.cache {
        if let Ok(Some(cached)) = cache.get::<CandidatesResponse>(&key).await {
            let mut response = cached;
            response.candidates.truncate(limit);
            return Ok(HttpResponse::Ok().json(response));
        }
    }

    // Compute up to the cap so the cached entry serves any smaller limit.
    let found = state
        .candidates
        .find_for(query.user_id, state.max_candidate_limit)
        .await?;
    let full = CandidatesResponse {
        total: found.len(),
        candidates: found.iter().map(CandidateView::from).collect(),
    };

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&key, &full).await {
            tracing::warn!("failed to cache candidates for {}: {}", query.user_id, e);
        }
    }

    let mut response = full;
    response.candidates.truncate(limit);
    Ok(HttpResponse::Ok().json(response))
}

/// Today's quota usage for a user.
pub async fn daily_status<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    let status = state.daily.status(query.user_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Today's featured candidate for a user.
pub async fn daily_pick<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    let pick = state
        .daily
        .daily_pick(query.user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("no candidates available today".to_string()))?;
    Ok(HttpResponse::Ok().json(pick))
}

/// Mark today's featured candidate as seen.
pub async fn mark_pick_viewed<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<PickViewedRequest>,
) -> Result<HttpResponse, ServiceError> {
    state.daily.mark_pick_viewed(req.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Open a friend-zone request for an active match.
pub async fn request_friend_zone<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<FriendZoneRequest>,
) -> Result<HttpResponse, ServiceError> {
    let request = state
        .relationships
        .request_friend_zone(req.requester_id, req.target_id)
        .await?;
    Ok(HttpResponse::Created().json(request))
}

pub async fn accept_friend_zone<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<RespondRequest>,
) -> Result<HttpResponse, ServiceError> {
    state
        .relationships
        .accept_friend_zone(path.into_inner(), req.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn decline_friend_zone<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<RespondRequest>,
) -> Result<HttpResponse, ServiceError> {
    state
        .relationships
        .decline_friend_zone(path.into_inner(), req.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn pending_friend_requests<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    let pending = state
        .relationships
        .pending_requests_for(query.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(pending))
}

pub async fn graceful_exit<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<GracefulExitRequest>,
) -> Result<HttpResponse, ServiceError> {
    state
        .relationships
        .graceful_exit(req.initiator_id, req.target_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unmatch<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<UnmatchRequest>,
) -> Result<HttpResponse, ServiceError> {
    state
        .relationships
        .unmatch(req.user_id, req.target_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn block_user<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<BlockRequest>,
) -> Result<HttpResponse, ServiceError> {
    state
        .relationships
        .block(req.blocker_id, req.blocked_id)
        .await?;

    if let Some(cache) = &state.cache {
        cache.invalidate_seeker(req.blocker_id).await;
        cache.invalidate_seeker(req.blocked_id).await;
    }

    Ok(HttpResponse::NoContent().finish())
}

/// A user's currently active matches, newest first.
pub async fn list_matches<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    let matches = state.store.active_matches_for(query.user_id).await?;
    Ok(HttpResponse::Ok().json(matches))
}

pub async fn list_notifications<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, ServiceError> {
    let notifications = state.store.notifications_for(query.user_id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

#[cfg(test)]
mod tests {
    use crate::models::HealthResponse;

    #[test]
    fn health_response_shape() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
