use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{Like, Match, SwipeDirection, UndoState};
use crate::storage::{Store, TransactionalStore, UndoStore};

/// What a successful undo removed.
#[derive(Debug, Clone)]
pub struct UndoOutcome {
    pub direction: SwipeDirection,
    pub match_removed: bool,
}

/// Single-slot, time-boxed swipe reversal.
///
/// Each user has at most one undo slot (the most recent swipe). The
/// deadline is checked lazily at read time; a periodic sweep clears slots
/// nobody came back for.
pub struct UndoService<S> {
    store: Arc<S>,
    window_secs: i64,
}

impl<S> Clone for UndoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            window_secs: self.window_secs,
        }
    }
}

impl<S: Store> UndoService<S> {
    pub fn new(store: Arc<S>, window_secs: i64) -> Self {
        Self { store, window_secs }
    }

    /// Arm the undo slot for a fresh swipe, replacing any previous slot.
    pub async fn record_swipe(
        &self,
        user: Uuid,
        like: Like,
        created: Option<&Match>,
    ) -> Result<(), ServiceError> {
        let state = UndoState {
            user_id: user,
            like,
            match_id: created.map(|m| m.id.clone()),
            expires_at: Utc::now() + Duration::seconds(self.window_secs),
        };
        self.store.save_undo_state(&state).await?;
        Ok(())
    }

    /// Whether an undo is currently possible. Discards an expired slot.
    pub async fn can_undo(&self, user: Uuid) -> Result<bool, ServiceError> {
        match self.store.undo_state_for(user).await? {
            None => Ok(false),
            Some(state) if state.is_expired(Utc::now()) => {
                self.store.delete_undo_state(user).await?;
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }

    /// Seconds left in the undo window; 0 when nothing is undoable.
    pub async fn seconds_remaining(&self, user: Uuid) -> Result<i64, ServiceError> {
        match self.store.undo_state_for(user).await? {
            Some(state) => Ok((state.expires_at - Utc::now()).num_seconds().max(0)),
            None => Ok(0),
        }
    }

    /// Reverse the most recent swipe: the like, the match it created (if
    /// any), and the slot itself go together in one transaction.
    pub async fn undo(&self, user: Uuid) -> Result<UndoOutcome, ServiceError> {
        let state = self
            .store
            .undo_state_for(user)
            .await?
            .ok_or_else(|| ServiceError::NotFound("no swipe to undo".to_string()))?;

        if state.is_expired(Utc::now()) {
            self.store.delete_undo_state(user).await?;
            return Err(ServiceError::UndoExpired);
        }

        let removed = self
            .store
            .undo_swipe(user, state.like.id, state.match_id.as_deref())
            .await?;
        if !removed {
            return Err(ServiceError::NotFound(
                "the swipe was already removed".to_string(),
            ));
        }

        tracing::info!(
            "undid {:?} swipe {} -> {} (match removed: {})",
            state.like.direction,
            state.like.from_user,
            state.like.to_user,
            state.match_id.is_some()
        );

        Ok(UndoOutcome {
            direction: state.like.direction,
            match_removed: state.match_id.is_some(),
        })
    }

    /// Clear the slot without undoing, e.g. when the swipe becomes final.
    pub async fn clear(&self, user: Uuid) -> Result<(), ServiceError> {
        self.store.delete_undo_state(user).await?;
        Ok(())
    }

    /// Periodic sweep for slots past their deadline.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        Ok(self.store.delete_expired_undo_states(now).await?)
    }
}
