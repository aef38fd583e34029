use std::sync::Arc;

use uuid::Uuid;

use crate::core::candidates::{find_candidates, Candidate};
use crate::core::distance::BoundingBox;
use crate::error::ServiceError;
use crate::models::UserProfile;
use crate::storage::{BlockStore, LikeStore, ProfileStore, Store};

/// Fetches the active pool and exclusion set, then delegates to the pure
/// candidate filter.
///
/// The storage bounding-box query is only a prefilter; the in-memory check
/// re-validates every rule exactly.
pub struct CandidateService<S> {
    store: Arc<S>,
}

impl<S> Clone for CandidateService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> CandidateService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Viable candidates for `seeker_id`, nearest first, at most `limit`.
    pub async fn find_for(
        &self,
        seeker_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Candidate>, ServiceError> {
        let seeker = self.seeker(seeker_id).await?;

        let mut excluded = self.store.swiped_user_ids(seeker_id).await?;
        excluded.extend(self.store.blocked_user_ids(seeker_id).await?);
        excluded.insert(seeker_id);

        let pool = match seeker.location {
            Some(center) => {
                let area = BoundingBox::around(center, f64::from(seeker.max_distance_km));
                self.store.active_profiles_within(&area).await?
            }
            None => self.store.active_profiles().await?,
        };

        tracing::debug!(
            "filtering {} active profiles for {} ({} excluded)",
            pool.len(),
            seeker_id,
            excluded.len()
        );

        let mut candidates = find_candidates(&seeker, &pool, &excluded);
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn seeker(&self, id: Uuid) -> Result<UserProfile, ServiceError> {
        self.store
            .profile(id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("unknown user {id}")))
    }
}
