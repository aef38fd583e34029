// Model exports
pub mod domain;
pub mod relationship;
pub mod requests;
pub mod responses;

pub use domain::{
    AccountState, Dealbreakers, Drinking, Education, Gender, GeoPoint, Lifestyle, LookingFor,
    Smoking, UserProfile, WantsKids,
};
pub use relationship::{
    match_id, Block, DailyPick, DailyStatus, EndReason, FriendRequest, FriendRequestStatus, Like,
    Match, MatchState, Notification, NotificationKind, SwipeDirection, UndoState,
};
pub use requests::{
    BlockRequest, FriendZoneRequest, GracefulExitRequest, PickViewedRequest, RespondRequest,
    SwipeRequest, UndoRequest, UnmatchRequest, UserQuery,
};
pub use responses::{
    CandidateView, CandidatesResponse, ErrorResponse, HealthResponse, SwipeResponse, UndoResponse,
};
