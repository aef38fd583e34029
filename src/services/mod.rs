// Service exports
pub mod cache;
pub mod candidates;
pub mod daily;
pub mod matching;
pub mod relationships;
pub mod undo;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use candidates::CandidateService;
pub use daily::DailyService;
pub use matching::{MatchingService, SwipeOutcome};
pub use relationships::RelationshipService;
pub use undo::{UndoOutcome, UndoService};
