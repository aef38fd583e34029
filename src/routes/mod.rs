// Route exports
pub mod api;

pub use api::AppState;

use actix_web::web;

use crate::storage::Store;

/// Configure all routes. Generic over the backing store so tests can mount
/// the same surface on the in-memory implementation.
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(api::health::<S>)).service(
        web::scope("/api/v1")
            .route("/swipes", web::post().to(api::record_swipe::<S>))
            .route("/swipes/undo", web::post().to(api::undo_swipe::<S>))
            .route("/candidates", web::get().to(api::list_candidates::<S>))
            .route("/matches", web::get().to(api::list_matches::<S>))
            .route("/daily/status", web::get().to(api::daily_status::<S>))
            .route("/daily/pick", web::get().to(api::daily_pick::<S>))
            .route(
                "/daily/pick/viewed",
                web::post().to(api::mark_pick_viewed::<S>),
            )
            .route(
                "/relationships/friend-zone",
                web::post().to(api::request_friend_zone::<S>),
            )
            .route(
                "/relationships/friend-zone/pending",
                web::get().to(api::pending_friend_requests::<S>),
            )
            .route(
                "/relationships/friend-zone/{id}/accept",
                web::post().to(api::accept_friend_zone::<S>),
            )
            .route(
                "/relationships/friend-zone/{id}/decline",
                web::post().to(api::decline_friend_zone::<S>),
            )
            .route(
                "/relationships/graceful-exit",
                web::post().to(api::graceful_exit::<S>),
            )
            .route("/relationships/unmatch", web::post().to(api::unmatch::<S>))
            .route("/blocks", web::post().to(api::block_user::<S>))
            .route(
                "/notifications",
                web::get().to(api::list_notifications::<S>),
            ),
    );
}
