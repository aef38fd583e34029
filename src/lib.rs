//! Ember Match - matchmaking and relationship engine for the Ember dating app
//!
//! This library implements the swipe-to-match core: atomic like→match
//! creation, time-boxed swipe undo, the match state machine (unmatch,
//! block, friend-zone, graceful exit), mutual-preference candidate
//! filtering, and daily engagement quotas.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use crate::core::candidates::{find_candidates, Candidate};
pub use error::ServiceError;
pub use models::{match_id, Like, Match, MatchState, SwipeDirection, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_library_exports() {
        let a = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let b = Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap();
        assert_eq!(match_id(a, b), match_id(b, a));
    }
}
