use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::candidates::Candidate;
use crate::models::{Gender, Match, SwipeDirection};
use crate::services::matching::SwipeOutcome;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Result of a swipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResponse {
    pub recorded: bool,
    pub matched: bool,
    pub limit_reached: bool,
    #[serde(rename = "match")]
    pub match_info: Option<Match>,
}

impl From<SwipeOutcome> for SwipeResponse {
    fn from(outcome: SwipeOutcome) -> Self {
        match outcome {
            SwipeOutcome::Matched(m) => Self {
                recorded: true,
                matched: true,
                limit_reached: false,
                match_info: Some(m),
            },
            SwipeOutcome::Liked | SwipeOutcome::Passed => Self {
                recorded: true,
                matched: false,
                limit_reached: false,
                match_info: None,
            },
            SwipeOutcome::LimitReached => Self {
                recorded: false,
                matched: false,
                limit_reached: true,
                match_info: None,
            },
        }
    }
}

/// Result of a successful undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResponse {
    pub undone_direction: SwipeDirection,
    pub match_removed: bool,
}

/// A candidate as presented to browsing clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    pub user_id: Uuid,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub distance_km: Option<f64>,
}

impl From<&Candidate> for CandidateView {
    fn from(candidate: &Candidate) -> Self {
        Self {
            user_id: candidate.profile.id,
            name: candidate.profile.name.clone(),
            age: candidate.profile.age,
            gender: candidate.profile.gender,
            distance_km: candidate.distance_km,
        }
    }
}

/// Response for candidate browsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub candidates: Vec<CandidateView>,
    pub total: usize,
}
