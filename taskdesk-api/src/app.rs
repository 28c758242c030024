/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{request_log::log_request, security::SecurityHeadersLayer},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::middleware::{authenticate, AuthError};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health               # public
/// └── /api/
///     ├── POST   /login            # public
///     ├── POST   /logout
///     ├── GET    /users
///     ├── POST   /users
///     ├── GET    /tasks
///     ├── POST   /tasks
///     ├── GET    /tasks/export
///     ├── GET    /tasks/:id
///     ├── PUT    /tasks/:id
///     ├── DELETE /tasks/:id
///     └── GET    /logs?page=N
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, tracing, then on `/api` the
/// request log and, for every route except login, JWT authentication.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/export", get(routes::tasks::export_tasks))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/logs", get(routes::logs::list_logs))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(log_request));

    let cors = if state.config.api.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([header::CONTENT_DISPOSITION])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let security = SecurityHeadersLayer::new(state.config.api.production);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(security)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Puts the [`AuthContext`](taskdesk_shared::auth::middleware::AuthContext)
/// into the request extensions for handlers and into the response
/// extensions for the request log.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate(&state.db, state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(auth.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(auth);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
    };
    use chrono::Duration;
    use taskdesk_shared::auth::jwt::{create_token, Claims};
    use taskdesk_shared::db::pool::{create_lazy_pool, DatabaseConfig};
    use taskdesk_shared::models::user::Role;
    use tower::Service as _;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret-at-least-32-bytes!!";

    fn test_state() -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://nobody@127.0.0.1:1/none".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap();

        let pool = create_lazy_pool(&DatabaseConfig::new(config.database.url.clone())).unwrap();
        AppState::new(pool, config)
    }

    async fn send(request: HttpRequest<Body>) -> Response {
        let mut app = build_router(test_state());
        app.call(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = send(
            HttpRequest::builder()
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get("x-content-type-options").is_some());

        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_rejects_non_bearer_scheme() {
        let response = send(
            HttpRequest::builder()
                .uri("/api/users")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_token_signed_with_other_secret() {
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, Duration::hours(1));
        let token = create_token(&claims, "a-completely-different-secret-of-32b+").unwrap();

        let response = send(
            HttpRequest::builder()
                .method("DELETE")
                .uri(format!("/api/tasks/{}", Uuid::new_v4()))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, Duration::hours(-2));
        let token = create_token(&claims, SECRET).unwrap();

        let response = send(
            HttpRequest::builder()
                .uri("/api/logs")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_body() {
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/login")
                .header("content-type", "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_login_validates_before_touching_database() {
        let response = send(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email":"nope","password":""}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = send(
            HttpRequest::builder()
                .uri("/api/nothing-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
