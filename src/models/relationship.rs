use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::UserProfile;

/// Direction of a swipe decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Like,
    Pass,
}

/// A like or pass from one user toward another.
///
/// At most one row exists per ordered (from, to) pair; re-swiping the same
/// pair replaces the previous decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(from_user: Uuid, to_user: Uuid, direction: SwipeDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user,
            to_user,
            direction,
            created_at: Utc::now(),
        }
    }
}

/// State of a match. `Active` is the initial state; every other state is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Active,
    Unmatched,
    Blocked,
    FriendZoned,
    GracefulExit,
}

/// Why a match (or its conversation) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "end_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Unmatch,
    Block,
    FriendZone,
    GracefulExit,
}

/// Builds the deterministic match id for an unordered pair of users:
/// the two ids sorted ascending, joined with `_`. Either side computes the
/// same id without a lookup.
pub fn match_id(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}_{hi}")
}

/// A mutual-interest relationship between two users.
///
/// `user_a` is always the smaller of the two ids so the row is unique per
/// unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: MatchState,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<Uuid>,
    pub end_reason: Option<EndReason>,
}

impl Match {
    /// Creates an active match for the pair, ordering the ids.
    pub fn new(a: Uuid, b: Uuid) -> Self {
        let (user_a, user_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: match_id(a, b),
            user_a,
            user_b,
            created_at: Utc::now(),
            state: MatchState::Active,
            ended_at: None,
            ended_by: None,
            end_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == MatchState::Active
    }

    pub fn involves(&self, user: Uuid) -> bool {
        self.user_a == user || self.user_b == user
    }

    /// The other participant, or `None` when `user` is not part of the match.
    pub fn other_user(&self, user: Uuid) -> Option<Uuid> {
        if self.user_a == user {
            Some(self.user_b)
        } else if self.user_b == user {
            Some(self.user_a)
        } else {
            None
        }
    }

    pub fn unmatch(&mut self, by: Uuid) -> Result<(), ServiceError> {
        self.end(MatchState::Unmatched, EndReason::Unmatch, by)
    }

    pub fn block(&mut self, by: Uuid) -> Result<(), ServiceError> {
        self.end(MatchState::Blocked, EndReason::Block, by)
    }

    pub fn friend_zone(&mut self, by: Uuid) -> Result<(), ServiceError> {
        self.end(MatchState::FriendZoned, EndReason::FriendZone, by)
    }

    pub fn graceful_exit(&mut self, by: Uuid) -> Result<(), ServiceError> {
        self.end(MatchState::GracefulExit, EndReason::GracefulExit, by)
    }

    // Transitions only leave Active; terminal states have no way out.
    fn end(&mut self, state: MatchState, reason: EndReason, by: Uuid) -> Result<(), ServiceError> {
        if !self.involves(by) {
            return Err(ServiceError::Validation(format!(
                "user {by} is not part of match {}",
                self.id
            )));
        }
        if !self.is_active() {
            return Err(ServiceError::StateConflict(format!(
                "match {} already ended ({:?})",
                self.id, self.state
            )));
        }
        self.state = state;
        self.ended_at = Some(Utc::now());
        self.ended_by = Some(by);
        self.end_reason = Some(reason);
        Ok(())
    }
}

/// The single undo slot for a user: the most recent swipe, the match it may
/// have created, and the deadline for reversing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoState {
    pub user_id: Uuid,
    pub like: Like,
    pub match_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl UndoState {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friend_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// A request to convert an active match into a platonic connection.
/// At most one pending request exists per unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn new(from_user: Uuid, to_user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user,
            to_user,
            status: FriendRequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

/// A block between two users. The effect on candidate visibility is
/// bidirectional: neither side sees the other again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub blocker: Uuid,
    pub blocked: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Block {
    pub fn new(blocker: Uuid, blocked: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            blocker,
            blocked,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MatchFound,
    FriendRequest,
    FriendRequestAccepted,
    GracefulExit,
}

/// A one-way message persisted for a user. Rendering and delivery belong to
/// the notification subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
            data,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of a user's daily quota usage. `None` remaining means the
/// corresponding quota is unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatus {
    pub likes_used: u32,
    pub likes_remaining: Option<u32>,
    pub passes_used: u32,
    pub passes_remaining: Option<u32>,
    pub resets_at: DateTime<Utc>,
}

/// The featured candidate for a user on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPick {
    pub profile: UserProfile,
    pub date: NaiveDate,
    pub viewed: bool,
}
