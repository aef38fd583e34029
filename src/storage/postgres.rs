use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::core::distance::BoundingBox;
use crate::models::{
    Block, FriendRequest, GeoPoint, Like, Match, Notification, SwipeDirection, UndoState,
    UserProfile,
};
use crate::storage::{
    BlockStore, ConversationStore, DailyPickStore, FriendRequestStore, HealthCheck, LikeStore,
    MatchStore, NotificationStore, ProfileStore, StorageError, TransactionalStore, UndoStore,
};

/// PostgreSQL-backed store.
///
/// Every multi-row operation in [`TransactionalStore`] runs inside a single
/// transaction; the like→match path additionally serializes writers per
/// user pair with an advisory lock so two opposite-direction swipes cannot
/// both miss the mutual check.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store from a connection string and run migrations.
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, StorageError> {
    let lat: Option<f64> = row.get("lat");
    let lon: Option<f64> = row.get("lon");
    let location = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
        _ => None,
    };

    Ok(UserProfile {
        id: row.get("id"),
        name: row.get("name"),
        gender: row.get("gender"),
        interested_in: serde_json::from_value(row.get("interested_in"))?,
        age: row.get::<i16, _>("age") as u8,
        location,
        max_distance_km: row.get::<i32, _>("max_distance_km") as u16,
        min_age: row.get::<i16, _>("min_age") as u8,
        max_age: row.get::<i16, _>("max_age") as u8,
        lifestyle: serde_json::from_value(row.get("lifestyle"))?,
        dealbreakers: serde_json::from_value(row.get("dealbreakers"))?,
        state: row.get("state"),
    })
}

fn like_from_row(row: &PgRow) -> Like {
    Like {
        id: row.get("id"),
        from_user: row.get("from_user"),
        to_user: row.get("to_user"),
        direction: row.get("direction"),
        created_at: row.get("created_at"),
    }
}

fn match_from_row(row: &PgRow) -> Match {
    Match {
        id: row.get("id"),
        user_a: row.get("user_a"),
        user_b: row.get("user_b"),
        created_at: row.get("created_at"),
        state: row.get("state"),
        ended_at: row.get("ended_at"),
        ended_by: row.get("ended_by"),
        end_reason: row.get("end_reason"),
    }
}

fn friend_request_from_row(row: &PgRow) -> FriendRequest {
    FriendRequest {
        id: row.get("id"),
        from_user: row.get("from_user"),
        to_user: row.get("to_user"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        responded_at: row.get("responded_at"),
    }
}

fn notification_from_row(row: &PgRow) -> Result<Notification, StorageError> {
    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        title: row.get("title"),
        body: row.get("body"),
        data: serde_json::from_value(row.get("data"))?,
        read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

const PROFILE_COLUMNS: &str = "id, name, gender, interested_in, age, lat, lon, \
     max_distance_km, min_age, max_age, lifestyle, dealbreakers, state";

/// Upsert keyed on the ordered pair: a re-swipe replaces the previous
/// decision and clears the soft-delete flag.
async fn upsert_like_with<'e, E>(executor: E, like: &Like) -> Result<(), StorageError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO likes (id, from_user, to_user, direction, created_at, deleted_at)
        VALUES ($1, $2, $3, $4, $5, NULL)
        ON CONFLICT (from_user, to_user)
        DO UPDATE SET
            id = EXCLUDED.id,
            direction = EXCLUDED.direction,
            created_at = EXCLUDED.created_at,
            deleted_at = NULL
        "#,
    )
    .bind(like.id)
    .bind(like.from_user)
    .bind(like.to_user)
    .bind(like.direction)
    .bind(like.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Terminal-state write, guarded on the row still being active.
async fn end_match_with<'e, E>(executor: E, ended: &Match) -> Result<bool, StorageError>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET state = $2, ended_at = $3, ended_by = $4, end_reason = $5
        WHERE id = $1 AND state = 'active'
        "#,
    )
    .bind(&ended.id)
    .bind(ended.state)
    .bind(ended.ended_at)
    .bind(ended.ended_by)
    .bind(ended.end_reason)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn insert_notification_with<'e, E>(
    executor: E,
    notification: &Notification,
) -> Result<(), StorageError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, body, data, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.body)
    .bind(serde_json::to_value(&notification.data)?)
    .bind(notification.read)
    .bind(notification.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

impl ProfileStore for PgStore {
    async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn active_profiles(&self) -> Result<Vec<UserProfile>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE state = 'active'"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn active_profiles_within(
        &self,
        area: &BoundingBox,
    ) -> Result<Vec<UserProfile>, StorageError> {
        // Locationless users skip distance filtering entirely, so the box
        // must keep them: it only ever over-selects.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM profiles
            WHERE state = 'active'
              AND (lat IS NULL
                   OR (lat BETWEEN $1 AND $2 AND lon BETWEEN $3 AND $4))
            "#
        ))
        .bind(area.min_lat)
        .bind(area.max_lat)
        .bind(area.min_lon)
        .bind(area.max_lon)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }
}

impl LikeStore for PgStore {
    async fn upsert_like(&self, like: &Like) -> Result<(), StorageError> {
        upsert_like_with(&self.pool, like).await
    }

    async fn like_between(&self, from: Uuid, to: Uuid) -> Result<Option<Like>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, from_user, to_user, direction, created_at
            FROM likes
            WHERE from_user = $1 AND to_user = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(like_from_row))
    }

    async fn mutual_like_exists(&self, a: Uuid, b: Uuid) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM likes l1
                JOIN likes l2
                  ON l2.from_user = l1.to_user AND l2.to_user = l1.from_user
                WHERE l1.from_user = $1 AND l1.to_user = $2
                  AND l1.direction = 'like' AND l2.direction = 'like'
                  AND l1.deleted_at IS NULL AND l2.deleted_at IS NULL
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn swiped_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        let rows = sqlx::query(
            "SELECT to_user FROM likes WHERE from_user = $1 AND deleted_at IS NULL",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("to_user")).collect())
    }

    async fn count_today(
        &self,
        user: Uuid,
        direction: SwipeDirection,
        day_start: DateTime<Utc>,
    ) -> Result<u32, StorageError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes
            WHERE from_user = $1 AND direction = $2
              AND created_at >= $3 AND deleted_at IS NULL
            "#,
        )
        .bind(user)
        .bind(direction)
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    async fn delete_like(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl MatchStore for PgStore {
    async fn insert_match(&self, m: &Match) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO matches (id, user_a, user_b, created_at, state)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&m.id)
        .bind(m.user_a)
        .bind(m.user_b)
        .bind(m.created_at)
        .bind(m.state)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn match_by_id(&self, id: &str) -> Result<Option<Match>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_a, user_b, created_at, state, ended_at, ended_by, end_reason
            FROM matches WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(match_from_row))
    }

    async fn match_exists(&self, id: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM matches WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn active_matches_for(&self, user: Uuid) -> Result<Vec<Match>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_a, user_b, created_at, state, ended_at, ended_by, end_reason
            FROM matches
            WHERE state = 'active' AND (user_a = $1 OR user_b = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    async fn end_match(&self, m: &Match) -> Result<bool, StorageError> {
        end_match_with(&self.pool, m).await
    }

    async fn delete_match(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl UndoStore for PgStore {
    async fn save_undo_state(&self, state: &UndoState) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO undo_states
                (user_id, like_id, from_user, to_user, direction, like_created_at, match_id, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id)
            DO UPDATE SET
                like_id = EXCLUDED.like_id,
                from_user = EXCLUDED.from_user,
                to_user = EXCLUDED.to_user,
                direction = EXCLUDED.direction,
                like_created_at = EXCLUDED.like_created_at,
                match_id = EXCLUDED.match_id,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(state.user_id)
        .bind(state.like.id)
        .bind(state.like.from_user)
        .bind(state.like.to_user)
        .bind(state.like.direction)
        .bind(state.like.created_at)
        .bind(&state.match_id)
        .bind(state.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn undo_state_for(&self, user: Uuid) -> Result<Option<UndoState>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, like_id, from_user, to_user, direction,
                   like_created_at, match_id, expires_at
            FROM undo_states WHERE user_id = $1
            "#,
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UndoState {
            user_id: row.get("user_id"),
            like: Like {
                id: row.get("like_id"),
                from_user: row.get("from_user"),
                to_user: row.get("to_user"),
                direction: row.get("direction"),
                created_at: row.get("like_created_at"),
            },
            match_id: row.get("match_id"),
            expires_at: row.get("expires_at"),
        }))
    }

    async fn delete_undo_state(&self, user: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM undo_states WHERE user_id = $1")
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_undo_states(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM undo_states WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl FriendRequestStore for PgStore {
    async fn insert_friend_request(&self, request: &FriendRequest) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO friend_requests (id, from_user, to_user, status, created_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.id)
        .bind(request.from_user)
        .bind(request.to_user)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.responded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn resolve_friend_request(&self, request: &FriendRequest) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE friend_requests
            SET status = $2, responded_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.responded_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn friend_request(&self, id: Uuid) -> Result<Option<FriendRequest>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, from_user, to_user, status, created_at, responded_at
            FROM friend_requests WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(friend_request_from_row))
    }

    async fn pending_request_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<FriendRequest>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, from_user, to_user, status, created_at, responded_at
            FROM friend_requests
            WHERE status = 'pending'
              AND ((from_user = $1 AND to_user = $2) OR (from_user = $2 AND to_user = $1))
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(friend_request_from_row))
    }

    async fn pending_requests_for(&self, user: Uuid) -> Result<Vec<FriendRequest>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_user, to_user, status, created_at, responded_at
            FROM friend_requests
            WHERE status = 'pending' AND to_user = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(friend_request_from_row).collect())
    }
}

impl BlockStore for PgStore {
    async fn blocked_user_ids(&self, user: Uuid) -> Result<HashSet<Uuid>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT CASE WHEN blocker = $1 THEN blocked ELSE blocker END AS other_user
            FROM blocks
            WHERE blocker = $1 OR blocked = $1
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("other_user")).collect())
    }
}

impl NotificationStore for PgStore {
    async fn push_notification(&self, notification: &Notification) -> Result<(), StorageError> {
        insert_notification_with(&self.pool, notification).await
    }

    async fn notifications_for(&self, user: Uuid) -> Result<Vec<Notification>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, body, data, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }
}

impl ConversationStore for PgStore {
    async fn conversation_between(&self, a: Uuid, b: Uuid) -> Result<Option<Uuid>, StorageError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM conversations
            WHERE (user_a = $1 AND user_b = $2) OR (user_a = $2 AND user_b = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}

impl DailyPickStore for PgStore {
    async fn pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM daily_pick_views WHERE user_id = $1 AND viewed_on = $2)",
        )
        .bind(user)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn mark_pick_viewed(&self, user: Uuid, date: NaiveDate) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO daily_pick_views (user_id, viewed_on, viewed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, viewed_on) DO NOTHING
            "#,
        )
        .bind(user)
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_pick_views_before(&self, date: NaiveDate) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM daily_pick_views WHERE viewed_on < $1")
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl TransactionalStore for PgStore {
    async fn record_swipe_and_match(&self, like: &Like) -> Result<Option<Match>, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Serialize writers per unordered pair. The lock is held until
        // commit, so of two racing opposite-direction swipes the second
        // waits here and then sees the first's like.
        let pair_id = crate::models::match_id(like.from_user, like.to_user);
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(&pair_id)
            .execute(&mut *tx)
            .await?;

        upsert_like_with(&mut *tx, like).await?;

        if like.direction != SwipeDirection::Like {
            tx.commit().await?;
            return Ok(None);
        }

        let reverse_like: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE from_user = $1 AND to_user = $2
                  AND direction = 'like' AND deleted_at IS NULL
            )
            "#,
        )
        .bind(like.to_user)
        .bind(like.from_user)
        .fetch_one(&mut *tx)
        .await?;

        if !reverse_like {
            tx.commit().await?;
            return Ok(None);
        }

        let m = Match::new(like.from_user, like.to_user);
        let inserted = sqlx::query(
            r#"
            INSERT INTO matches (id, user_a, user_b, created_at, state)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&m.id)
        .bind(m.user_a)
        .bind(m.user_b)
        .bind(m.created_at)
        .bind(m.state)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if inserted.rows_affected() == 0 {
            tracing::debug!("pair {} already has a match row", pair_id);
            return Ok(None);
        }
        Ok(Some(m))
    }

    async fn undo_swipe(
        &self,
        user: Uuid,
        like_id: Uuid,
        match_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(like_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // Overwritten by a newer swipe; nothing to unwind.
            return Ok(false);
        }

        if let Some(id) = match_id {
            sqlx::query("DELETE FROM matches WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM undo_states WHERE user_id = $1")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn accept_friend_zone(
        &self,
        request: &FriendRequest,
        ended: &Match,
        notification: &Notification,
    ) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        let resolved = sqlx::query(
            r#"
            UPDATE friend_requests
            SET status = $2, responded_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.responded_at)
        .execute(&mut *tx)
        .await?;
        if resolved.rows_affected() == 0 {
            return Ok(false);
        }

        if !end_match_with(&mut *tx, ended).await? {
            return Ok(false);
        }

        insert_notification_with(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn graceful_exit(
        &self,
        ended: &Match,
        conversation: Option<Uuid>,
        notification: &Notification,
    ) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        if !end_match_with(&mut *tx, ended).await? {
            return Ok(false);
        }

        if let Some(id) = conversation {
            sqlx::query(
                r#"
                UPDATE conversations
                SET archived_at = NOW(), archive_reason = $2
                WHERE id = $1 AND archived_at IS NULL
                "#,
            )
            .bind(id)
            .bind(ended.end_reason)
            .execute(&mut *tx)
            .await?;
        }

        insert_notification_with(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn block_user(
        &self,
        block: &Block,
        ended: Option<&Match>,
    ) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO blocks (id, blocker, blocked, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (blocker, blocked) DO NOTHING
            "#,
        )
        .bind(block.id)
        .bind(block.blocker)
        .bind(block.blocked)
        .bind(block.created_at)
        .execute(&mut *tx)
        .await?;

        let transitioned = match ended {
            Some(m) => end_match_with(&mut *tx, m).await?,
            None => false,
        };

        tx.commit().await?;
        Ok(transitioned)
    }
}

impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
