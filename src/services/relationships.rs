use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{
    match_id, Block, FriendRequest, FriendRequestStatus, Notification, NotificationKind,
};
use crate::storage::{
    ConversationStore, FriendRequestStore, MatchStore, NotificationStore, Store,
    TransactionalStore,
};

/// Non-swipe transitions of the match state machine: friend-zone
/// request/accept/decline, graceful exit, unmatch, and block.
///
/// Every transition validates against the state machine first, then hands
/// the pre-built rows to the store, whose guarded writes settle races: if a
/// row moved underneath, nothing is applied and the caller sees a state
/// conflict.
pub struct RelationshipService<S> {
    store: Arc<S>,
}

impl<S> Clone for RelationshipService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> RelationshipService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open a friend-zone request. Requires an active match between the
    /// pair and no pending request in either direction.
    pub async fn request_friend_zone(
        &self,
        requester: Uuid,
        target: Uuid,
    ) -> Result<FriendRequest, ServiceError> {
        if requester == target {
            return Err(ServiceError::Validation(
                "cannot friend-zone yourself".to_string(),
            ));
        }

        let active = self
            .store
            .match_by_id(&match_id(requester, target))
            .await?
            .is_some_and(|m| m.is_active());
        if !active {
            return Err(ServiceError::StateConflict(
                "an active match is required to request the friend zone".to_string(),
            ));
        }

        if self
            .store
            .pending_request_between(requester, target)
            .await?
            .is_some()
        {
            return Err(ServiceError::StateConflict(
                "a friend-zone request is already pending between these users".to_string(),
            ));
        }

        let request = FriendRequest::new(requester, target);
        self.store.insert_friend_request(&request).await?;

        self.store
            .push_notification(&Notification::new(
                target,
                NotificationKind::FriendRequest,
                "New friend request",
                "Someone wants to move your match to the friend zone.",
                HashMap::from([("fromUserId".to_string(), requester.to_string())]),
            ))
            .await?;

        Ok(request)
    }

    /// Accept a pending request. Resolves the request, ends the match as
    /// friend-zoned, and notifies the requester, all or nothing.
    pub async fn accept_friend_zone(
        &self,
        request_id: Uuid,
        responder: Uuid,
    ) -> Result<(), ServiceError> {
        let request = self.pending_request(request_id, responder, "accept").await?;

        let mut ended = self
            .store
            .match_by_id(&match_id(request.from_user, request.to_user))
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("no match exists for this friend request".to_string())
            })?;
        // The requester initiated the transition.
        ended.friend_zone(request.from_user)?;

        let mut accepted = request.clone();
        accepted.status = FriendRequestStatus::Accepted;
        accepted.responded_at = Some(Utc::now());

        let note = Notification::new(
            request.from_user,
            NotificationKind::FriendRequestAccepted,
            "Friend request accepted",
            "Your match has moved to the friend zone.",
            HashMap::from([("responderId".to_string(), responder.to_string())]),
        );

        let applied = self
            .store
            .accept_friend_zone(&accepted, &ended, &note)
            .await?;
        if !applied {
            return Err(ServiceError::StateConflict(
                "the request or the match changed before the transition could apply".to_string(),
            ));
        }

        tracing::info!("match {} friend-zoned via request {}", ended.id, request_id);
        Ok(())
    }

    /// Decline a pending request; the match is untouched.
    pub async fn decline_friend_zone(
        &self,
        request_id: Uuid,
        responder: Uuid,
    ) -> Result<(), ServiceError> {
        let request = self.pending_request(request_id, responder, "decline").await?;

        let mut declined = request;
        declined.status = FriendRequestStatus::Declined;
        declined.responded_at = Some(Utc::now());

        let applied = self.store.resolve_friend_request(&declined).await?;
        if !applied {
            return Err(ServiceError::StateConflict(
                "request is no longer pending".to_string(),
            ));
        }
        Ok(())
    }

    /// Unilaterally end an active match, archiving the conversation and
    /// notifying the other party, all or nothing.
    pub async fn graceful_exit(&self, initiator: Uuid, target: Uuid) -> Result<(), ServiceError> {
        let mut ended = self
            .store
            .match_by_id(&match_id(initiator, target))
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("no relationship exists between these users".to_string())
            })?;
        ended.graceful_exit(initiator)?;

        let conversation = self.store.conversation_between(initiator, target).await?;
        let note = Notification::new(
            target,
            NotificationKind::GracefulExit,
            "Relationship ended",
            "The other user has gracefully moved on from this relationship.",
            HashMap::from([("initiatorId".to_string(), initiator.to_string())]),
        );

        let applied = self
            .store
            .graceful_exit(&ended, conversation, &note)
            .await?;
        if !applied {
            return Err(ServiceError::StateConflict(
                "the match changed before the exit could apply".to_string(),
            ));
        }

        tracing::info!("match {} ended via graceful exit by {}", ended.id, initiator);
        Ok(())
    }

    /// End an active match without ceremony.
    pub async fn unmatch(&self, user: Uuid, target: Uuid) -> Result<(), ServiceError> {
        let mut ended = self
            .store
            .match_by_id(&match_id(user, target))
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("no match exists between these users".to_string())
            })?;
        ended.unmatch(user)?;

        let applied = self.store.end_match(&ended).await?;
        if !applied {
            return Err(ServiceError::StateConflict(
                "match already ended".to_string(),
            ));
        }
        Ok(())
    }

    /// Block a user. The block record always lands; when the pair still
    /// has an active match it is terminated in the same transaction.
    pub async fn block(&self, blocker: Uuid, blocked: Uuid) -> Result<(), ServiceError> {
        if blocker == blocked {
            return Err(ServiceError::Validation(
                "cannot block yourself".to_string(),
            ));
        }

        let ended = match self.store.match_by_id(&match_id(blocker, blocked)).await? {
            Some(mut m) if m.is_active() => {
                m.block(blocker)?;
                Some(m)
            }
            _ => None,
        };

        let transitioned = self.store.block_user(&Block::new(blocker, blocked), ended.as_ref()).await?;
        if transitioned {
            tracing::info!("match between {} and {} ended by block", blocker, blocked);
        }
        Ok(())
    }

    pub async fn pending_requests_for(
        &self,
        user: Uuid,
    ) -> Result<Vec<FriendRequest>, ServiceError> {
        Ok(self.store.pending_requests_for(user).await?)
    }

    /// Fetch a request and check the responder may act on it.
    async fn pending_request(
        &self,
        request_id: Uuid,
        responder: Uuid,
        action: &str,
    ) -> Result<FriendRequest, ServiceError> {
        let request = self
            .store
            .friend_request(request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("friend request not found".to_string()))?;

        if request.to_user != responder {
            return Err(ServiceError::StateConflict(format!(
                "only the recipient can {action} a friend request"
            )));
        }
        if !request.is_pending() {
            return Err(ServiceError::StateConflict(
                "request is no longer pending".to_string(),
            ));
        }
        Ok(request)
    }
}
