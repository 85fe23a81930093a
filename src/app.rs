use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::{auth_gate, AllowList};
use crate::services::{CommentService, HotPlaceService, PostService, RecruitmentService, TourService, UserService};

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub allow_list: Arc<AllowList>,
    pub users: UserService,
    pub posts: PostService,
    pub comments: CommentService,
    pub hot_places: HotPlaceService,
    pub recruitments: RecruitmentService,
    pub tours: TourService,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self {
            allow_list: Arc::new(AllowList::new(&config.security.public_paths)),
            users: UserService::new(pool.clone(), tokens.clone()),
            posts: PostService::new(pool.clone(), &config.pagination),
            comments: CommentService::new(pool.clone()),
            hot_places: HotPlaceService::new(pool.clone()),
            recruitments: RecruitmentService::new(pool.clone()),
            tours: TourService::new(pool.clone()),
            config: Arc::new(config),
            tokens,
            pool,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let image_dir = Path::new(&state.config.storage.image_dir);
    let user_images = ServeDir::new(image_dir.join("users"));
    let hot_place_images = ServeDir::new(image_dir.join("hot-places"));
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(user_routes())
        .merge(post_routes())
        .merge(comment_routes())
        .merge(hot_place_routes())
        .merge(recruitment_routes())
        .merge(tour_routes())
        // Uploaded images
        .nest_service("/api/v1/users/images", user_images)
        .nest_service("/api/v1/hot-places/images", hot_place_images)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

fn user_routes() -> Router<AppState> {
    use protected::users;
    use public::auth;

    Router::new()
        .route("/api/v1/users/join", post(auth::join))
        .route("/api/v1/users/login", post(auth::login))
        .route("/api/v1/users/refresh-token", post(auth::refresh_token))
        .route("/api/v1/users/me", get(users::me))
        .route("/api/v1/users/password-check", post(users::password_check))
        .route("/api/v1/users/:id", get(users::profile).put(users::update).delete(users::remove))
        .route("/api/v1/users/:id/password", put(users::change_password))
}

fn post_routes() -> Router<AppState> {
    use protected::{comments, posts};

    Router::new()
        .route("/api/v1/posts", get(posts::list).post(posts::create))
        .route("/api/v1/posts/page-count", get(posts::page_count))
        .route("/api/v1/posts/home", get(public::posts_home))
        .route("/api/v1/posts/:id", get(posts::detail).put(posts::update).delete(posts::remove))
        .route("/api/v1/posts/:id/like", post(posts::toggle_like))
        .route("/api/v1/posts/:id/likes", get(posts::likers))
        .route("/api/v1/posts/:id/notice", put(posts::toggle_notice))
        .route("/api/v1/posts/:id/comments", get(comments::list).post(comments::create))
}

fn comment_routes() -> Router<AppState> {
    use protected::comments;

    Router::new().route("/api/v1/comments/:id", put(comments::update).delete(comments::remove))
}

fn hot_place_routes() -> Router<AppState> {
    use protected::hot_places;

    Router::new()
        .route("/api/v1/hot-places", get(hot_places::list).post(hot_places::create))
        .route(
            "/api/v1/hot-places/:id",
            get(hot_places::detail).put(hot_places::update).delete(hot_places::remove),
        )
}

fn recruitment_routes() -> Router<AppState> {
    use protected::recruitments;

    Router::new()
        .route("/api/v1/recruitments", get(recruitments::list).post(recruitments::create))
        .route(
            "/api/v1/recruitments/:id",
            get(recruitments::detail).put(recruitments::update).delete(recruitments::remove),
        )
        .route(
            "/api/v1/recruitments/:id/participants",
            get(recruitments::participants)
                .post(recruitments::join)
                .delete(recruitments::leave),
        )
}

fn tour_routes() -> Router<AppState> {
    use public::tours;

    Router::new()
        .route("/api/v1/tours", get(tours::search))
        .route("/api/v1/tours/:content_id", get(tours::detail))
}
