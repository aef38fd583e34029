use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{
    Like, Match, Notification, NotificationKind, SwipeDirection, UserProfile,
};
use crate::services::daily::DailyService;
use crate::services::undo::UndoService;
use crate::storage::{NotificationStore, ProfileStore, Store, TransactionalStore};

/// Result of a quota-gated swipe.
#[derive(Debug, Clone)]
pub enum SwipeOutcome {
    Matched(Match),
    Liked,
    Passed,
    LimitReached,
}

/// Records swipe decisions and creates a match exactly when mutual
/// interest exists.
///
/// The like upsert, the mutual check, and the match insert share one
/// transaction at the store boundary, so two opposite-direction likes
/// racing each other produce exactly one match row.
pub struct MatchingService<S> {
    store: Arc<S>,
    daily: DailyService<S>,
    undo: UndoService<S>,
}

impl<S> Clone for MatchingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            daily: self.daily.clone(),
            undo: self.undo.clone(),
        }
    }
}

impl<S: Store> MatchingService<S> {
    pub fn new(store: Arc<S>, daily: DailyService<S>, undo: UndoService<S>) -> Self {
        Self { store, daily, undo }
    }

    /// Persist a swipe decision; returns the match when this swipe
    /// completed mutual interest, `None` otherwise (pass, like-only, or
    /// the pair already has a match row).
    pub async fn record_like(&self, like: Like) -> Result<Option<Match>, ServiceError> {
        if like.from_user == like.to_user {
            return Err(ServiceError::Validation(
                "cannot swipe on yourself".to_string(),
            ));
        }
        self.require_profile(like.from_user).await?;
        self.require_profile(like.to_user).await?;

        let created = self.store.record_swipe_and_match(&like).await?;

        if let Some(m) = &created {
            tracing::info!("match {} created", m.id);
            self.notify_match(m).await;
        }

        Ok(created)
    }

    /// Quota-gated swipe entry point: checks the daily limit, records the
    /// decision, and arms the undo slot.
    pub async fn swipe(
        &self,
        from: Uuid,
        to: Uuid,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, ServiceError> {
        let allowed = match direction {
            SwipeDirection::Like => self.daily.can_like(from).await?,
            SwipeDirection::Pass => self.daily.can_pass(from).await?,
        };
        if !allowed {
            return Ok(SwipeOutcome::LimitReached);
        }

        let like = Like::new(from, to, direction);
        let created = self.record_like(like.clone()).await?;
        self.undo.record_swipe(from, like, created.as_ref()).await?;

        Ok(match created {
            Some(m) => SwipeOutcome::Matched(m),
            None if direction == SwipeDirection::Like => SwipeOutcome::Liked,
            None => SwipeOutcome::Passed,
        })
    }

    async fn require_profile(&self, id: Uuid) -> Result<UserProfile, ServiceError> {
        self.store
            .profile(id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("unknown user {id}")))
    }

    // Best-effort: the match is already committed; a failed notification
    // write must not fail the swipe.
    async fn notify_match(&self, m: &Match) {
        for (user, other) in [(m.user_a, m.user_b), (m.user_b, m.user_a)] {
            let note = Notification::new(
                user,
                NotificationKind::MatchFound,
                "It's a match!",
                "You and your match both liked each other.",
                HashMap::from([("matchedUserId".to_string(), other.to_string())]),
            );
            if let Err(e) = self.store.push_notification(&note).await {
                tracing::warn!("match {} created but notifying {} failed: {}", m.id, user, e);
            }
        }
    }
}
