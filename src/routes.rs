// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{comment, dashboard, like, playlist, subscription, tweet, user, video},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (users, videos, comments, likes, playlists,
///   subscriptions, tweets, dashboard).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, media client).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let user_routes = Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/refresh-token", post(user::refresh_token))
        .merge(
            Router::new()
                .route("/logout", post(user::logout))
                .route("/change-password", post(user::change_password))
                .route("/current-user", get(user::current_user))
                .route("/update-account", patch(user::update_account))
                .route("/avatar", patch(user::update_avatar))
                .route("/cover-image", patch(user::update_cover_image))
                .layer(auth.clone()),
        );

    let video_routes = Router::new()
        .route("/", get(video::list_videos))
        .route("/{id}", get(video::get_video))
        .merge(
            Router::new()
                .route("/", post(video::publish_video))
                .route(
                    "/{id}",
                    patch(video::update_video).delete(video::delete_video),
                )
                .route("/toggle/{id}", patch(video::toggle_publish_status))
                .layer(auth.clone()),
        );

    let comment_routes = Router::new()
        .route("/{videoId}", get(comment::list_comments))
        .merge(
            Router::new()
                .route("/{videoId}", post(comment::add_comment))
                .route(
                    "/c/{commentId}",
                    patch(comment::update_comment).delete(comment::delete_comment),
                )
                .layer(auth.clone()),
        );

    let like_routes = Router::new()
        .route("/video/{videoId}", post(like::toggle_video_like))
        .route("/comment/{commentId}", post(like::toggle_comment_like))
        .route("/tweet/{tweetId}", post(like::toggle_tweet_like))
        .route("/videos", get(like::get_liked_videos))
        .layer(auth.clone());

    let playlist_routes = Router::new()
        .route("/{playlistId}", get(playlist::get_playlist))
        .route("/user/{userId}", get(playlist::get_user_playlists))
        .merge(
            Router::new()
                .route("/", post(playlist::create_playlist))
                .route(
                    "/{playlistId}",
                    patch(playlist::update_playlist).delete(playlist::delete_playlist),
                )
                .route(
                    "/add/{videoId}/{playlistId}",
                    patch(playlist::add_video_to_playlist),
                )
                .route(
                    "/remove/{videoId}/{playlistId}",
                    patch(playlist::remove_video_from_playlist),
                )
                .layer(auth.clone()),
        );

    let subscription_routes = Router::new()
        .route("/c/{channelId}", get(subscription::get_channel_subscribers))
        .route("/u/{subscriberId}", get(subscription::get_subscribed_channels))
        .merge(
            Router::new()
                .route("/{channelId}", post(subscription::toggle_subscription))
                .layer(auth.clone()),
        );

    let tweet_routes = Router::new()
        .route("/user/{userId}", get(tweet::get_user_tweets))
        .merge(
            Router::new()
                .route("/", post(tweet::create_tweet))
                .route(
                    "/{tweetId}",
                    patch(tweet::update_tweet).delete(tweet::delete_tweet),
                )
                .layer(auth.clone()),
        );

    let dashboard_routes = Router::new()
        .route("/stats/{channelId}", get(dashboard::get_channel_stats))
        .route("/videos/{channelId}", get(dashboard::get_channel_videos));

    Router::new()
        .nest("/users", user_routes)
        .nest("/videos", video_routes)
        .nest("/comments", comment_routes)
        .nest("/likes", like_routes)
        .nest("/playlists", playlist_routes)
        .nest("/subscriptions", subscription_routes)
        .nest("/tweets", tweet_routes)
        .nest("/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
