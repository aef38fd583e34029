// Storage contracts consumed by the engines, plus the two implementations:
// PostgreSQL for deployment and an in-process store for tests and local runs.
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::core::distance::BoundingBox;
use crate::models::{
    Block, FriendRequest, Like, Match, Notification, SwipeDirection, UndoState, UserProfile,
};

/// Errors surfaced by any store implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Read-only access to user profiles. Profiles are owned by the profile
/// subsystem; this service never writes them.
pub trait ProfileStore {
    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, StorageError>;

    async fn active_profiles(&self) -> Result<Vec<UserProfile>, StorageError>;

    /// Active profiles inside `area`, plus every active profile without a
    /// location (they skip distance filtering, so a box must not drop them).
    async fn active_profiles_within(
        &self,
        area: &BoundingBox,
    ) -> Result<Vec<UserProfile>, StorageError>;
}

pub trait LikeStore {
    /// Insert the swipe, replacing any previous decision for the ordered
    /// pair and clearing its soft-delete flag.
    async fn upsert_like(&self, like: &Like) -> Result<(), StorageError>;

    async fn like_between(&self, from: Uuid, to: Uuid) -> Result<Option<Like>, StorageError>;

    async fn mutual_like_exists(&self, a: Uuid, b: Uuid) -> Result<bool, StorageError>;

    /// Everyone `user` has already liked or passed on.
    async fn swiped_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError>;

    async fn count_today(
        &self,
        user: Uuid,
        direction: SwipeDirection,
        day_start: DateTime<Utc>,
    ) -> Result<u32, StorageError>;

    async fn delete_like(&self, id: Uuid) -> Result<bool, StorageError>;
}

pub trait MatchStore {
    /// Insert a new match row; `false` when the pair already has one.
    async fn insert_match(&self, m: &Match) -> Result<bool, StorageError>;

    async fn match_by_id(&self, id: &str) -> Result<Option<Match>, StorageError>;

    async fn match_exists(&self, id: &str) -> Result<bool, StorageError>;

    async fn active_matches_for(&self, user: Uuid) -> Result<Vec<Match>, StorageError>;

    /// Write an ended match's terminal state, guarded on the row still
    /// being active; `false` when another writer got there first.
    async fn end_match(&self, m: &Match) -> Result<bool, StorageError>;

    async fn delete_match(&self, id: &str) -> Result<bool, StorageError>;
}

pub trait UndoStore {
    /// Save the user's undo slot, replacing any existing one.
    async fn save_undo_state(&self, state: &UndoState) -> Result<(), StorageError>;

    async fn undo_state_for(&self, user: Uuid) -> Result<Option<UndoState>, StorageError>;

    async fn delete_undo_state(&self, user: Uuid) -> Result<bool, StorageError>;

    /// Sweep for slots past their deadline. Returns how many were removed.
    async fn delete_expired_undo_states(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

pub trait FriendRequestStore {
    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError>;

    /// Write a resolved (accepted/declined) request, guarded on the row
    /// still being pending; `false` when it was already resolved.
    async fn resolve_friend_request(&self, request: &FriendRequest) -> Result<bool, StorageError>;

    async fn friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>, StorageError>;

    async fn pending_request_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<FriendRequest>, StorageError>;

    async fn pending_requests_for(&self, user: Uuid) -> Result<Vec<FriendRequest>, StorageError>;
}

pub trait BlockStore {
    /// Everyone blocked by `user` or who blocked `user`.
    async fn blocked_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError>;
}

pub trait NotificationStore {
    async fn push_notification(&self, notification: &Notification) -> Result<(), StorageError>;

    async fn notifications_for(&self, user: Uuid) -> Result<Vec<Notification>, StorageError>;
}

/// Conversations are owned by the messaging subsystem; this service only
/// resolves the one for a pair so a transition can archive it.
pub trait ConversationStore {
    async fn conversation_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>, StorageError>;
}

pub trait DailyPickStore {
    async fn pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<bool, StorageError>;

    async fn mark_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<(), StorageError>;

    async fn delete_pick_views_before(&self, date: NaiveDate) -> Result<u64, StorageError>;
}

/// The multi-row operations whose correctness rests on a single
/// transaction. Implementations must make each all-or-nothing; a `false`
/// return means a guard failed (a row changed underneath) and nothing was
/// written.
pub trait TransactionalStore {
    /// Upsert the swipe and create the match exactly when mutual LIKE
    /// interest holds and no row exists for the pair yet. Of two racing
    /// opposite-direction swipes, exactly one receives the match.
    async fn record_swipe_and_match(&self, like: &Like) -> Result<Option<Match>, StorageError>;

    /// Delete the like, the match it created (when present), and the undo
    /// slot together. `false` when the like row was already gone.
    async fn undo_swipe(
        &self,
        user: Uuid,
        like_id: Uuid,
        match_id: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// Resolve the request, end the match, and persist the notification in
    /// one transaction.
    async fn accept_friend_zone(
        &self,
        request: &FriendRequest,
        ended: &Match,
        notification: &Notification,
    ) -> Result<bool, StorageError>;

    /// End the match, archive the conversation (when one exists), and
    /// persist the notification in one transaction.
    async fn graceful_exit(
        &self,
        ended: &Match,
        conversation: Option<Uuid>,
        notification: &Notification,
    ) -> Result<bool, StorageError>;

    /// Persist the block record and, when the pair still has an active
    /// match, its terminal transition, together. Returns whether the match
    /// transition was applied.
    async fn block_user(&self, block: &Block, ended: Option<&Match>)
        -> Result<bool, StorageError>;
}

pub trait HealthCheck {
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Everything the engines need from one backing store.
pub trait Store:
    ProfileStore
    + LikeStore
    + MatchStore
    + UndoStore
    + FriendRequestStore
    + BlockStore
    + NotificationStore
    + ConversationStore
    + DailyPickStore
    + TransactionalStore
    + HealthCheck
    + Send
    + Sync
    + 'static
{
}

impl<T> Store for T where
    T: ProfileStore
        + LikeStore
        + MatchStore
        + UndoStore
        + FriendRequestStore
        + BlockStore
        + NotificationStore
        + ConversationStore
        + DailyPickStore
        + TransactionalStore
        + HealthCheck
        + Send
        + Sync
        + 'static
{
}
