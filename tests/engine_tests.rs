// End-to-end engine flows against the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use ember_match::config::MatchingSettings;
use ember_match::error::ServiceError;
use ember_match::models::{
    match_id, AccountState, Dealbreakers, FriendRequestStatus, Gender, GeoPoint, Like, Match,
    MatchState, NotificationKind, SwipeDirection, UndoState, UserProfile,
};
use ember_match::services::{
    CandidateService, DailyService, MatchingService, RelationshipService, SwipeOutcome,
    UndoService,
};
use ember_match::storage::{
    FriendRequestStore, LikeStore, MatchStore, MemoryStore, NotificationStore, UndoStore,
};

fn profile(gender: Gender, interested_in: Gender, age: u8) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        name: format!("User {}", &Uuid::new_v4().to_string()[..8]),
        gender,
        interested_in: HashSet::from([interested_in]),
        age,
        location: Some(GeoPoint {
            lat: 40.7128,
            lon: -74.0060,
        }),
        max_distance_km: 50,
        min_age: 18,
        max_age: 60,
        lifestyle: Default::default(),
        dealbreakers: Dealbreakers::none(),
        state: AccountState::Active,
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    matching: MatchingService<MemoryStore>,
    undo: UndoService<MemoryStore>,
    relationships: RelationshipService<MemoryStore>,
    daily: DailyService<MemoryStore>,
    candidates: CandidateService<MemoryStore>,
}

fn harness_with(settings: MatchingSettings) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let daily = DailyService::new(Arc::clone(&store), settings.clone());
    let undo = UndoService::new(Arc::clone(&store), settings.undo_window_secs);
    let matching = MatchingService::new(Arc::clone(&store), daily.clone(), undo.clone());
    let relationships = RelationshipService::new(Arc::clone(&store));
    let candidates = CandidateService::new(Arc::clone(&store));
    Harness {
        store,
        matching,
        undo,
        relationships,
        daily,
        candidates,
    }
}

fn harness() -> Harness {
    harness_with(MatchingSettings::default())
}

/// Two active users who fit each other's preferences.
fn seeded_pair(h: &Harness) -> (UserProfile, UserProfile) {
    let a = profile(Gender::Male, Gender::Female, 30);
    let b = profile(Gender::Female, Gender::Male, 28);
    h.store.put_profile(a.clone());
    h.store.put_profile(b.clone());
    (a, b)
}

async fn matched_pair(h: &Harness) -> (UserProfile, UserProfile) {
    let (a, b) = seeded_pair(h);
    h.matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Like))
        .await
        .unwrap();
    let created = h
        .matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();
    assert!(created.is_some());
    (a, b)
}

#[tokio::test]
async fn mutual_like_creates_exactly_one_match() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    let first = h
        .matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Like))
        .await
        .unwrap();
    assert!(first.is_none(), "one-sided like must not match");

    let second = h
        .matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();
    let m = second.expect("mutual like must create the match");
    assert_eq!(m.id, match_id(a.id, b.id));
    assert_eq!(m.state, MatchState::Active);

    // Re-recording either side changes nothing: the row already exists.
    let again = h
        .matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();
    assert!(again.is_none());

    assert!(h.store.mutual_like_exists(a.id, b.id).await.unwrap());
    assert_eq!(h.store.active_matches_for(a.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_keeps_one_match_row_per_pair() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    let m = Match::new(a.id, b.id);
    assert!(h.store.insert_match(&m).await.unwrap());
    assert!(
        !h.store.insert_match(&Match::new(b.id, a.id)).await.unwrap(),
        "the reversed pair maps to the same row"
    );

    assert!(h.store.delete_match(&m.id).await.unwrap());
    assert!(!h.store.match_exists(&m.id).await.unwrap());

    // Like rows are addressable by id for the undo path.
    let like = Like::new(a.id, b.id, SwipeDirection::Pass);
    h.store.upsert_like(&like).await.unwrap();
    assert!(h.store.delete_like(like.id).await.unwrap());
    assert!(h.store.like_between(a.id, b.id).await.unwrap().is_none());
}

#[tokio::test]
async fn match_id_is_identical_whichever_side_swipes_last() {
    let h1 = harness();
    let (a, b) = seeded_pair(&h1);

    let h2 = harness();
    h2.store.put_profile(a.clone());
    h2.store.put_profile(b.clone());

    h1.matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Like))
        .await
        .unwrap();
    let m1 = h1
        .matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap()
        .unwrap();

    h2.matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();
    let m2 = h2
        .matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Like))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(m1.id, m2.id);
}

#[tokio::test]
async fn concurrent_opposite_likes_produce_a_single_match() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    let (left, right) = tokio::join!(
        h.matching
            .record_like(Like::new(a.id, b.id, SwipeDirection::Like)),
        h.matching
            .record_like(Like::new(b.id, a.id, SwipeDirection::Like)),
    );

    let created = [left.unwrap(), right.unwrap()]
        .into_iter()
        .flatten()
        .count();
    assert_eq!(created, 1, "exactly one side observes the match creation");
    assert!(h
        .store
        .match_exists(&match_id(a.id, b.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn pass_never_creates_a_match() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Pass))
        .await
        .unwrap();
    let result = h
        .matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(!h.store.match_exists(&match_id(a.id, b.id)).await.unwrap());
}

#[tokio::test]
async fn reswipe_overwrites_a_pass_and_can_complete_a_match() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Pass))
        .await
        .unwrap();
    h.matching
        .record_like(Like::new(b.id, a.id, SwipeDirection::Like))
        .await
        .unwrap();

    // A reconsiders: the pass row is replaced and mutual interest now holds.
    let created = h
        .matching
        .record_like(Like::new(a.id, b.id, SwipeDirection::Like))
        .await
        .unwrap();
    assert!(created.is_some());

    let stored = h.store.like_between(a.id, b.id).await.unwrap().unwrap();
    assert_eq!(stored.direction, SwipeDirection::Like);
}

#[tokio::test]
async fn self_swipes_and_unknown_users_are_rejected() {
    let h = harness();
    let (a, _) = seeded_pair(&h);

    let err = h
        .matching
        .record_like(Like::new(a.id, a.id, SwipeDirection::Like))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let ghost = Uuid::new_v4();
    let err = h
        .matching
        .record_like(Like::new(a.id, ghost, SwipeDirection::Like))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn swipe_stops_at_the_daily_like_limit() {
    let settings = MatchingSettings {
        daily_like_limit: 2,
        ..MatchingSettings::default()
    };
    let h = harness_with(settings);

    let seeker = profile(Gender::Male, Gender::Female, 30);
    h.store.put_profile(seeker.clone());
    let targets: Vec<UserProfile> = (0..3)
        .map(|_| {
            let p = profile(Gender::Female, Gender::Male, 28);
            h.store.put_profile(p.clone());
            p
        })
        .collect();

    for target in &targets[..2] {
        let outcome = h
            .matching
            .swipe(seeker.id, target.id, SwipeDirection::Like)
            .await
            .unwrap();
        assert!(matches!(outcome, SwipeOutcome::Liked));
    }

    let outcome = h
        .matching
        .swipe(seeker.id, targets[2].id, SwipeDirection::Like)
        .await
        .unwrap();
    assert!(matches!(outcome, SwipeOutcome::LimitReached));

    // Nothing was written for the rejected swipe, and passes still work.
    assert_eq!(h.store.swiped_user_ids(seeker.id).await.unwrap().len(), 2);
    let outcome = h
        .matching
        .swipe(seeker.id, targets[2].id, SwipeDirection::Pass)
        .await
        .unwrap();
    assert!(matches!(outcome, SwipeOutcome::Passed));
}

#[tokio::test]
async fn matching_swipe_arms_undo_and_notifies_both_users() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .swipe(b.id, a.id, SwipeDirection::Like)
        .await
        .unwrap();
    let outcome = h
        .matching
        .swipe(a.id, b.id, SwipeDirection::Like)
        .await
        .unwrap();
    let m = match outcome {
        SwipeOutcome::Matched(m) => m,
        other => panic!("expected a match, got {other:?}"),
    };

    let slot = h.store.undo_state_for(a.id).await.unwrap().unwrap();
    assert_eq!(slot.match_id.as_deref(), Some(m.id.as_str()));

    for user in [a.id, b.id] {
        let notes = h.store.notifications_for(user).await.unwrap();
        assert!(
            notes.iter().any(|n| n.kind == NotificationKind::MatchFound),
            "user {user} should be notified of the match"
        );
    }
}

#[tokio::test]
async fn undo_within_window_unwinds_like_match_and_candidacy() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .swipe(b.id, a.id, SwipeDirection::Like)
        .await
        .unwrap();
    h.matching
        .swipe(a.id, b.id, SwipeDirection::Like)
        .await
        .unwrap();
    assert!(h.store.match_exists(&match_id(a.id, b.id)).await.unwrap());

    assert!(h.undo.can_undo(a.id).await.unwrap());
    assert!(h.undo.seconds_remaining(a.id).await.unwrap() > 0);

    let outcome = h.undo.undo(a.id).await.unwrap();
    assert_eq!(outcome.direction, SwipeDirection::Like);
    assert!(outcome.match_removed);

    assert!(h.store.like_between(a.id, b.id).await.unwrap().is_none());
    assert!(!h.store.match_exists(&match_id(a.id, b.id)).await.unwrap());
    assert!(h.store.undo_state_for(a.id).await.unwrap().is_none());

    // B is browsable for A again.
    let found = h.candidates.find_for(a.id, 10).await.unwrap();
    assert!(found.iter().any(|c| c.profile.id == b.id));

    // The slot is consumed: a second undo has nothing to work with.
    let err = h.undo.undo(a.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn expired_undo_fails_and_discards_the_slot() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .swipe(a.id, b.id, SwipeDirection::Like)
        .await
        .unwrap();

    // Rewind the deadline instead of waiting out the window.
    let mut slot = h.store.undo_state_for(a.id).await.unwrap().unwrap();
    slot.expires_at = Utc::now() - Duration::seconds(1);
    h.store.save_undo_state(&slot).await.unwrap();

    let err = h.undo.undo(a.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::UndoExpired));

    // The stale slot is gone but the swipe itself stands.
    assert!(h.store.undo_state_for(a.id).await.unwrap().is_none());
    assert!(h.store.like_between(a.id, b.id).await.unwrap().is_some());
    assert!(!h.undo.can_undo(a.id).await.unwrap());
}

#[tokio::test]
async fn clearing_the_slot_forfeits_the_undo() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.matching
        .swipe(a.id, b.id, SwipeDirection::Like)
        .await
        .unwrap();
    assert!(h.undo.can_undo(a.id).await.unwrap());

    h.undo.clear(a.id).await.unwrap();
    assert!(!h.undo.can_undo(a.id).await.unwrap());
    assert!(h.store.like_between(a.id, b.id).await.unwrap().is_some());
}

#[tokio::test]
async fn sweep_removes_only_expired_slots() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    let expired = UndoState {
        user_id: a.id,
        like: Like::new(a.id, b.id, SwipeDirection::Pass),
        match_id: None,
        expires_at: Utc::now() - Duration::seconds(5),
    };
    let live = UndoState {
        user_id: b.id,
        like: Like::new(b.id, a.id, SwipeDirection::Like),
        match_id: None,
        expires_at: Utc::now() + Duration::seconds(30),
    };
    h.store.save_undo_state(&expired).await.unwrap();
    h.store.save_undo_state(&live).await.unwrap();

    let removed = h.undo.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(removed, 1);
    assert!(h.store.undo_state_for(a.id).await.unwrap().is_none());
    assert!(h.store.undo_state_for(b.id).await.unwrap().is_some());
}

#[tokio::test]
async fn friend_zone_lifecycle_happy_path() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;

    let request = h.relationships.request_friend_zone(a.id, b.id).await.unwrap();
    assert_eq!(request.status, FriendRequestStatus::Pending);

    let notes = h.store.notifications_for(b.id).await.unwrap();
    assert!(notes
        .iter()
        .any(|n| n.kind == NotificationKind::FriendRequest));

    let pending = h.relationships.pending_requests_for(b.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, request.id);

    h.relationships
        .accept_friend_zone(request.id, b.id)
        .await
        .unwrap();

    let stored = h.store.friend_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FriendRequestStatus::Accepted);
    assert!(stored.responded_at.is_some());

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::FriendZoned);
    assert_eq!(m.ended_by, Some(a.id), "the requester initiated the transition");

    let notes = h.store.notifications_for(a.id).await.unwrap();
    assert!(notes
        .iter()
        .any(|n| n.kind == NotificationKind::FriendRequestAccepted));
}

#[tokio::test]
async fn friend_zone_request_requires_active_match_and_no_duplicate() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    // No match at all yet.
    let err = h
        .relationships
        .request_friend_zone(a.id, b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));

    let (a, b) = matched_pair(&h).await;
    h.relationships.request_friend_zone(a.id, b.id).await.unwrap();

    // A second request in either direction conflicts with the pending one.
    let err = h
        .relationships
        .request_friend_zone(b.id, a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));
}

#[tokio::test]
async fn friend_zone_responses_are_guarded() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;
    let request = h.relationships.request_friend_zone(a.id, b.id).await.unwrap();

    // Only the recipient may respond.
    let err = h
        .relationships
        .accept_friend_zone(request.id, a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));

    h.relationships
        .accept_friend_zone(request.id, b.id)
        .await
        .unwrap();

    // Responding again conflicts and leaves the match untouched.
    let err = h
        .relationships
        .accept_friend_zone(request.id, b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::FriendZoned);

    let err = h
        .relationships
        .accept_friend_zone(Uuid::new_v4(), b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn declining_leaves_the_match_active() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;
    let request = h.relationships.request_friend_zone(a.id, b.id).await.unwrap();

    h.relationships
        .decline_friend_zone(request.id, b.id)
        .await
        .unwrap();

    let stored = h.store.friend_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FriendRequestStatus::Declined);

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::Active);

    // The pair may try again now that nothing is pending.
    h.relationships.request_friend_zone(b.id, a.id).await.unwrap();
}

#[tokio::test]
async fn graceful_exit_archives_and_notifies() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;
    let conversation = h.store.put_conversation(a.id, b.id);

    h.relationships.graceful_exit(a.id, b.id).await.unwrap();

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::GracefulExit);
    assert_eq!(m.ended_by, Some(a.id));

    assert!(matches!(
        h.store.conversation_archive_reason(conversation),
        Some(ember_match::models::EndReason::GracefulExit)
    ));

    let notes = h.store.notifications_for(b.id).await.unwrap();
    assert!(notes
        .iter()
        .any(|n| n.kind == NotificationKind::GracefulExit));

    // Terminal state: a second exit conflicts.
    let err = h.relationships.graceful_exit(b.id, a.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));
}

#[tokio::test]
async fn unmatch_is_terminal() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;

    h.relationships.unmatch(a.id, b.id).await.unwrap();

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::Unmatched);

    let err = h.relationships.unmatch(b.id, a.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::StateConflict(_)));
}

#[tokio::test]
async fn blocking_ends_the_match_and_hides_both_sides() {
    let h = harness();
    let (a, b) = matched_pair(&h).await;

    h.relationships.block(a.id, b.id).await.unwrap();

    let m = h
        .store
        .match_by_id(&match_id(a.id, b.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.state, MatchState::Blocked);
    assert_eq!(m.end_reason, Some(ember_match::models::EndReason::Block));

    // Neither direction surfaces the other as a candidate anymore.
    assert!(h
        .candidates
        .find_for(a.id, 10)
        .await
        .unwrap()
        .iter()
        .all(|c| c.profile.id != b.id));
    assert!(h
        .candidates
        .find_for(b.id, 10)
        .await
        .unwrap()
        .iter()
        .all(|c| c.profile.id != a.id));
}

#[tokio::test]
async fn blocking_without_a_match_still_records_the_block() {
    let h = harness();
    let (a, b) = seeded_pair(&h);

    h.relationships.block(a.id, b.id).await.unwrap();

    assert!(h
        .candidates
        .find_for(b.id, 10)
        .await
        .unwrap()
        .iter()
        .all(|c| c.profile.id != a.id));
}

#[tokio::test]
async fn daily_status_reflects_usage_and_reset_time() {
    let settings = MatchingSettings {
        daily_like_limit: 5,
        ..MatchingSettings::default()
    };
    let h = harness_with(settings);

    let seeker = profile(Gender::Male, Gender::Female, 30);
    h.store.put_profile(seeker.clone());
    for _ in 0..3 {
        let target = profile(Gender::Female, Gender::Male, 28);
        h.store.put_profile(target.clone());
        h.matching
            .swipe(seeker.id, target.id, SwipeDirection::Like)
            .await
            .unwrap();
    }
    let passed = profile(Gender::Female, Gender::Male, 28);
    h.store.put_profile(passed.clone());
    h.matching
        .swipe(seeker.id, passed.id, SwipeDirection::Pass)
        .await
        .unwrap();

    let status = h.daily.status(seeker.id).await.unwrap();
    assert_eq!(status.likes_used, 3);
    assert_eq!(status.likes_remaining, Some(2));
    assert_eq!(status.passes_used, 1);
    assert!(status.resets_at > Utc::now());

    assert!(h.daily.can_like(seeker.id).await.unwrap());
}

#[tokio::test]
async fn unlimited_likes_never_exhaust() {
    let settings = MatchingSettings {
        daily_like_limit: 1,
        unlimited_likes: true,
        ..MatchingSettings::default()
    };
    let h = harness_with(settings);

    let seeker = profile(Gender::Male, Gender::Female, 30);
    h.store.put_profile(seeker.clone());
    for _ in 0..4 {
        let target = profile(Gender::Female, Gender::Male, 28);
        h.store.put_profile(target.clone());
        let outcome = h
            .matching
            .swipe(seeker.id, target.id, SwipeDirection::Like)
            .await
            .unwrap();
        assert!(!matches!(outcome, SwipeOutcome::LimitReached));
    }

    let status = h.daily.status(seeker.id).await.unwrap();
    assert_eq!(status.likes_remaining, None);
}

#[tokio::test]
async fn daily_pick_is_stable_and_viewing_costs_no_quota() {
    let h = harness();
    let seeker = profile(Gender::Male, Gender::Female, 30);
    h.store.put_profile(seeker.clone());
    for _ in 0..5 {
        h.store
            .put_profile(profile(Gender::Female, Gender::Male, 28));
    }

    let first = h.daily.daily_pick(seeker.id).await.unwrap().unwrap();
    let second = h.daily.daily_pick(seeker.id).await.unwrap().unwrap();
    assert_eq!(first.profile.id, second.profile.id);
    assert!(!first.viewed);
    assert!(!h.daily.pick_viewed(seeker.id).await.unwrap());

    h.daily.mark_pick_viewed(seeker.id).await.unwrap();
    assert!(h.daily.pick_viewed(seeker.id).await.unwrap());
    let third = h.daily.daily_pick(seeker.id).await.unwrap().unwrap();
    assert!(third.viewed);
    assert_eq!(third.profile.id, first.profile.id);

    let status = h.daily.status(seeker.id).await.unwrap();
    assert_eq!(status.likes_used, 0, "viewing the pick is not a swipe");
}

#[tokio::test]
async fn daily_pick_is_none_without_candidates() {
    let h = harness();
    let seeker = profile(Gender::Male, Gender::Female, 30);
    h.store.put_profile(seeker.clone());

    assert!(h.daily.daily_pick(seeker.id).await.unwrap().is_none());
}
