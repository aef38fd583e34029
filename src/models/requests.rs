use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::SwipeDirection;

/// Request to record a swipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub user_id: Uuid,
    pub target_user_id: Uuid,
    pub direction: SwipeDirection,
}

/// Request to undo the caller's most recent swipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoRequest {
    pub user_id: Uuid,
}

/// Query for candidate browsing and daily endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Uuid,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<u16>,
}

/// Marks today's featured pick as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickViewedRequest {
    pub user_id: Uuid,
}

/// Request to open a friend-zone transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendZoneRequest {
    pub requester_id: Uuid,
    pub target_id: Uuid,
}

/// Accept/decline body; the responder must be the request's target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GracefulExitRequest {
    pub initiator_id: Uuid,
    pub target_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchRequest {
    pub user_id: Uuid,
    pub target_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
}
