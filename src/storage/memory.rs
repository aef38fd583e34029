use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::core::distance::BoundingBox;
use crate::models::{
    match_id, Block, EndReason, FriendRequest, Like, Match, MatchState, Notification,
    SwipeDirection, UndoState, UserProfile,
};
use crate::storage::{
    BlockStore, ConversationStore, DailyPickStore, FriendRequestStore, HealthCheck, LikeStore,
    MatchStore, NotificationStore, ProfileStore, StorageError, TransactionalStore, UndoStore,
};

#[derive(Debug, Clone)]
struct ConversationRow {
    id: Uuid,
    user_a: Uuid,
    user_b: Uuid,
    archived: Option<EndReason>,
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, UserProfile>,
    likes: HashMap<(Uuid, Uuid), Like>,
    matches: HashMap<String, Match>,
    undo_states: HashMap<Uuid, UndoState>,
    friend_requests: HashMap<Uuid, FriendRequest>,
    blocks: Vec<Block>,
    notifications: Vec<Notification>,
    conversations: Vec<ConversationRow>,
    pick_views: HashSet<(Uuid, NaiveDate)>,
}

/// In-process store backing the integration tests and local development.
///
/// A single mutex serializes every operation, which makes each composite
/// write trivially atomic and gives racing swipes the same
/// one-writer-at-a-time behavior the PostgreSQL store gets from its
/// per-pair transaction lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a profile. Profiles are owned by the profile subsystem, so the
    /// trait surface has no writes; tests and dev seeding use this instead.
    pub fn put_profile(&self, profile: UserProfile) {
        self.lock().profiles.insert(profile.id, profile);
    }

    /// Seed a conversation for a pair, returning its id.
    pub fn put_conversation(&self, a: Uuid, b: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().conversations.push(ConversationRow {
            id,
            user_a: a,
            user_b: b,
            archived: None,
        });
        id
    }

    /// The archive reason recorded for a conversation, if any.
    pub fn conversation_archive_reason(&self, id: Uuid) -> Option<EndReason> {
        self.lock()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.archived)
    }
}

impl Inner {
    fn mutual_like(&self, a: Uuid, b: Uuid) -> bool {
        let forward = self
            .likes
            .get(&(a, b))
            .is_some_and(|l| l.direction == SwipeDirection::Like);
        let backward = self
            .likes
            .get(&(b, a))
            .is_some_and(|l| l.direction == SwipeDirection::Like);
        forward && backward
    }

    fn end_match_guarded(&mut self, ended: &Match) -> bool {
        match self.matches.get_mut(&ended.id) {
            Some(existing) if existing.state == MatchState::Active => {
                *existing = ended.clone();
                true
            }
            _ => false,
        }
    }
}

impl ProfileStore for MemoryStore {
    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.lock().profiles.get(&id).cloned())
    }

    async fn active_profiles(&self) -> Result<Vec<UserProfile>, StorageError> {
        Ok(self
            .lock()
            .profiles
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect())
    }

    async fn active_profiles_within(
        &self,
        area: &BoundingBox,
    ) -> Result<Vec<UserProfile>, StorageError> {
        Ok(self
            .lock()
            .profiles
            .values()
            .filter(|p| p.is_active())
            .filter(|p| p.location.map_or(true, |loc| area.contains(loc)))
            .cloned()
            .collect())
    }
}

impl LikeStore for MemoryStore {
    async fn upsert_like(&self, like: &Like) -> Result<(), StorageError> {
        self.lock()
            .likes
            .insert((like.from_user, like.to_user), like.clone());
        Ok(())
    }

    async fn like_between(&self, from: Uuid, to: Uuid) -> Result<Option<Like>, StorageError> {
        Ok(self.lock().likes.get(&(from, to)).cloned())
    }

    async fn mutual_like_exists(&self, a: Uuid, b: Uuid) -> Result<bool, StorageError> {
        Ok(self.lock().mutual_like(a, b))
    }

    async fn swiped_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        Ok(self
            .lock()
            .likes
            .values()
            .filter(|l| l.from_user == user)
            .map(|l| l.to_user)
            .collect())
    }

    async fn count_today(
        &self,
        user: Uuid,
        direction: SwipeDirection,
        day_start: DateTime<Utc>,
    ) -> Result<u32, StorageError> {
        Ok(self
            .lock()
            .likes
            .values()
            .filter(|l| l.from_user == user && l.direction == direction)
            .filter(|l| l.created_at >= day_start)
            .count() as u32)
    }

    async fn delete_like(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        let key = inner
            .likes
            .iter()
            .find(|(_, l)| l.id == id)
            .map(|(k, _)| *k);
        Ok(match key {
            Some(k) => inner.likes.remove(&k).is_some(),
            None => false,
        })
    }
}

impl MatchStore for MemoryStore {
    async fn insert_match(&self, m: &Match) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        if inner.matches.contains_key(&m.id) {
            return Ok(false);
        }
        inner.matches.insert(m.id.clone(), m.clone());
        Ok(true)
    }

    async fn match_by_id(&self, id: &str) -> Result<Option<Match>, StorageError> {
        Ok(self.lock().matches.get(id).cloned())
    }

    async fn match_exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.lock().matches.contains_key(id))
    }

    async fn active_matches_for(&self, user: Uuid) -> Result<Vec<Match>, StorageError> {
        Ok(self
            .lock()
            .matches
            .values()
            .filter(|m| m.is_active() && m.involves(user))
            .cloned()
            .collect())
    }

    async fn end_match(&self, m: &Match) -> Result<bool, StorageError> {
        Ok(self.lock().end_match_guarded(m))
    }

    async fn delete_match(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.lock().matches.remove(id).is_some())
    }
}

impl UndoStore for MemoryStore {
    async fn save_undo_state(&self, state: &UndoState) -> Result<(), StorageError> {
        self.lock().undo_states.insert(state.user_id, state.clone());
        Ok(())
    }

    async fn undo_state_for(&self, user: Uuid) -> Result<Option<UndoState>, StorageError> {
        Ok(self.lock().undo_states.get(&user).cloned())
    }

    async fn delete_undo_state(&self, user: Uuid) -> Result<bool, StorageError> {
        Ok(self.lock().undo_states.remove(&user).is_some())
    }

    async fn delete_expired_undo_states(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let mut inner = self.lock();
        let before = inner.undo_states.len();
        inner.undo_states.retain(|_, s| !s.is_expired(now));
        Ok((before - inner.undo_states.len()) as u64)
    }
}

impl FriendRequestStore for MemoryStore {
    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError> {
        self.lock()
            .friend_requests
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn resolve_friend_request(&self, request: &FriendRequest) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        match inner.friend_requests.get_mut(&request.id) {
            Some(existing) if existing.is_pending() => {
                *existing = request.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>, StorageError> {
        Ok(self.lock().friend_requests.get(&id).cloned())
    }

    async fn pending_request_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<FriendRequest>, StorageError> {
        Ok(self
            .lock()
            .friend_requests
            .values()
            .find(|r| {
                r.is_pending()
                    && ((r.from_user == a && r.to_user == b)
                        || (r.from_user == b && r.to_user == a))
            })
            .cloned())
    }

    async fn pending_requests_for(&self, user: Uuid) -> Result<Vec<FriendRequest>, StorageError> {
        Ok(self
            .lock()
            .friend_requests
            .values()
            .filter(|r| r.is_pending() && r.to_user == user)
            .cloned()
            .collect())
    }
}

impl BlockStore for MemoryStore {
    async fn blocked_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        Ok(self
            .lock()
            .blocks
            .iter()
            .filter_map(|b| {
                if b.blocker == user {
                    Some(b.blocked)
                } else if b.blocked == user {
                    Some(b.blocker)
                } else {
                    None
                }
            })
            .collect())
    }
}

impl NotificationStore for MemoryStore {
    async fn push_notification(&self, notification: &Notification) -> Result<(), StorageError> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }

    async fn notifications_for(&self, user: Uuid) -> Result<Vec<Notification>, StorageError> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect())
    }
}

impl ConversationStore for MemoryStore {
    async fn conversation_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>, StorageError> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| {
                (c.user_a == a && c.user_b == b) || (c.user_a == b && c.user_b == a)
            })
            .map(|c| c.id))
    }
}

impl DailyPickStore for MemoryStore {
    async fn pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<bool, StorageError> {
        Ok(self.lock().pick_views.contains(&(user, date)))
    }

    async fn mark_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<(), StorageError> {
        self.lock().pick_views.insert((user, date));
        Ok(())
    }

    async fn delete_pick_views_before(&self, date: NaiveDate) -> Result<u64, StorageError> {
        let mut inner = self.lock();
        let before = inner.pick_views.len();
        inner.pick_views.retain(|(_, d)| *d >= date);
        Ok((before - inner.pick_views.len()) as u64)
    }
}

impl TransactionalStore for MemoryStore {
    async fn record_swipe_and_match(&self, like: &Like) -> Result<Option<Match>, StorageError> {
        let mut inner = self.lock();

        inner
            .likes
            .insert((like.from_user, like.to_user), like.clone());

        if like.direction != SwipeDirection::Like {
            return Ok(None);
        }
        if !inner.mutual_like(like.from_user, like.to_user) {
            return Ok(None);
        }

        let id = match_id(like.from_user, like.to_user);
        if inner.matches.contains_key(&id) {
            return Ok(None);
        }

        let m = Match::new(like.from_user, like.to_user);
        inner.matches.insert(id, m.clone());
        Ok(Some(m))
    }

    async fn undo_swipe(
        &self,
        user: Uuid,
        like_id: Uuid,
        match_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();

        let key = inner
            .likes
            .iter()
            .find(|(_, l)| l.id == like_id)
            .map(|(k, _)| *k);
        let Some(key) = key else {
            return Ok(false);
        };

        inner.likes.remove(&key);
        if let Some(id) = match_id {
            inner.matches.remove(id);
        }
        inner.undo_states.remove(&user);
        Ok(true)
    }

    async fn accept_friend_zone(
        &self,
        request: &FriendRequest,
        ended: &Match,
        notification: &Notification,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();

        let pending = inner
            .friend_requests
            .get(&request.id)
            .is_some_and(|r| r.is_pending());
        if !pending {
            return Ok(false);
        }
        if !inner.end_match_guarded(ended) {
            return Ok(false);
        }
        inner.friend_requests.insert(request.id, request.clone());
        inner.notifications.push(notification.clone());
        Ok(true)
    }

    async fn graceful_exit(
        &self,
        ended: &Match,
        conversation: Option<Uuid>,
        notification: &Notification,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();

        if !inner.end_match_guarded(ended) {
            return Ok(false);
        }
        if let Some(id) = conversation {
            if let Some(convo) = inner.conversations.iter_mut().find(|c| c.id == id) {
                convo.archived.get_or_insert(EndReason::GracefulExit);
            }
        }
        inner.notifications.push(notification.clone());
        Ok(true)
    }

    async fn block_user(
        &self,
        block: &Block,
        ended: Option<&Match>,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();

        let already = inner
            .blocks
            .iter()
            .any(|b| b.blocker == block.blocker && b.blocked == block.blocked);
        if !already {
            inner.blocks.push(block.clone());
        }

        Ok(match ended {
            Some(m) => inner.end_match_guarded(m),
            None => false,
        })
    }
}

impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
