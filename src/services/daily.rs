use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::config::{DayBoundary, MatchingSettings};
use crate::error::ServiceError;
use crate::models::{DailyPick, DailyStatus, SwipeDirection};
use crate::services::candidates::CandidateService;
use crate::storage::{DailyPickStore, LikeStore, Store};

/// Daily engagement quotas and the once-a-day featured pick.
///
/// Quotas are counted from the configured day boundary. Viewing the daily
/// pick never consumes quota; only actually swiping on it does.
pub struct DailyService<S> {
    store: Arc<S>,
    candidates: CandidateService<S>,
    settings: MatchingSettings,
}

impl<S> Clone for DailyService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            candidates: self.candidates.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<S: Store> DailyService<S> {
    pub fn new(store: Arc<S>, settings: MatchingSettings) -> Self {
        let candidates = CandidateService::new(Arc::clone(&store));
        Self {
            store,
            candidates,
            settings,
        }
    }

    pub async fn can_like(&self, user: Uuid) -> Result<bool, ServiceError> {
        if self.settings.unlimited_likes {
            return Ok(true);
        }
        let used = self
            .store
            .count_today(user, SwipeDirection::Like, self.day_start())
            .await?;
        Ok(used < self.settings.daily_like_limit)
    }

    pub async fn can_pass(&self, user: Uuid) -> Result<bool, ServiceError> {
        if self.settings.unlimited_passes {
            return Ok(true);
        }
        let used = self
            .store
            .count_today(user, SwipeDirection::Pass, self.day_start())
            .await?;
        Ok(used < self.settings.daily_pass_limit)
    }

    /// Usage snapshot; `None` remaining means unlimited.
    pub async fn status(&self, user: Uuid) -> Result<DailyStatus, ServiceError> {
        let day_start = self.day_start();
        let likes_used = self
            .store
            .count_today(user, SwipeDirection::Like, day_start)
            .await?;
        let passes_used = self
            .store
            .count_today(user, SwipeDirection::Pass, day_start)
            .await?;

        Ok(DailyStatus {
            likes_used,
            likes_remaining: remaining(
                self.settings.unlimited_likes,
                self.settings.daily_like_limit,
                likes_used,
            ),
            passes_used,
            passes_remaining: remaining(
                self.settings.unlimited_passes,
                self.settings.daily_pass_limit,
                passes_used,
            ),
            resets_at: self.resets_at(),
        })
    }

    /// The featured candidate for today: deterministic per user and day, so
    /// repeated calls surface the same profile while the pool is stable.
    pub async fn daily_pick(&self, seeker: Uuid) -> Result<Option<DailyPick>, ServiceError> {
        let candidates = self.candidates.find_for(seeker, usize::MAX).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let date = self.today();
        let index = pick_index(seeker, date, candidates.len());
        let viewed = self.store.pick_viewed(seeker, date).await?;

        Ok(Some(DailyPick {
            profile: candidates[index].profile.clone(),
            date,
            viewed,
        }))
    }

    pub async fn pick_viewed(&self, user: Uuid) -> Result<bool, ServiceError> {
        Ok(self.store.pick_viewed(user, self.today()).await?)
    }

    pub async fn mark_pick_viewed(&self, user: Uuid) -> Result<(), ServiceError> {
        Ok(self.store.mark_pick_viewed(user, self.today()).await?)
    }

    /// Drop view rows older than the retention window.
    pub async fn sweep_pick_views(&self) -> Result<u64, ServiceError> {
        let cutoff = self.today() - chrono::Days::new(u64::from(self.settings.pick_view_retention_days));
        Ok(self.store.delete_pick_views_before(cutoff).await?)
    }

    fn today(&self) -> NaiveDate {
        match self.settings.day_boundary {
            DayBoundary::Utc => Utc::now().date_naive(),
            DayBoundary::Local => Local::now().date_naive(),
        }
    }

    fn day_start(&self) -> DateTime<Utc> {
        self.boundary_instant(self.today())
    }

    fn resets_at(&self) -> DateTime<Utc> {
        self.boundary_instant(self.today() + chrono::Days::new(1))
    }

    /// Midnight of `date` in the configured zone, as a UTC instant.
    fn boundary_instant(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.settings.day_boundary {
            DayBoundary::Utc => midnight.and_utc(),
            DayBoundary::Local => midnight
                .and_local_timezone(Local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                // A zone transition exactly at midnight: fall back to UTC.
                .unwrap_or_else(|| midnight.and_utc()),
        }
    }
}

fn remaining(unlimited: bool, limit: u32, used: u32) -> Option<u32> {
    if unlimited {
        None
    } else {
        Some(limit.saturating_sub(used))
    }
}

/// Stable index for the day's pick: an FNV-style fold over the user id and
/// the day number. Deliberately not a process-seeded hash so restarts keep
/// the same pick.
fn pick_index(user: Uuid, date: NaiveDate, len: usize) -> usize {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in user.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    let day = date.num_days_from_ce() as u64;
    for byte in day.to_le_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    (hash % len as u64) as usize
}
