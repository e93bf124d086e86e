pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod messages;
pub mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use furrow_core::{AccountService, MessagingService};
use furrow_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub accounts: AccountService,
    pub messaging: MessagingService,
    pub admin_key: String,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, admin_key: String) -> Self {
        Self {
            accounts: AccountService::new(db.clone()),
            messaging: MessagingService::new(db.clone()),
            db,
            admin_key,
        }
    }
}

/// Run a store-backed operation off the async runtime.
pub(crate) async fn run_blocking<F, T, E>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(Into::into)
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/accounts", get(admin::list_accounts))
        .route("/admin/toggle-active", post(admin::toggle_active))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN_KEY: &str = "test-admin-key";

    fn app() -> Router {
        let db = Arc::new(Database::open_in_memory().unwrap());
        router(Arc::new(AppStateInner::new(db, ADMIN_KEY.into())))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_admin(mut req: Request<Body>, key: &str) -> Request<Body> {
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", key).parse().unwrap(),
        );
        req
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn register(app: &Router, name: &str, email: &str, role: &str) -> String {
        let (status, body) = call(
            app,
            post_json(
                "/auth/register",
                json!({"name": name, "email": email, "password": "pw", "role": role}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Registered successfully");
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn register_login_and_conflict() {
        let app = app();
        let id = register(&app, "Fern", "fern@example.com", "farmer").await;

        let (status, body) = call(
            &app,
            post_json("/auth/login", json!({"email": "fern@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["account"]["id"], id);
        assert_eq!(body["account"]["role"], "farmer");
        assert_eq!(body["account"]["is_active"], true);
        assert!(body["account"].get("password_hash").is_none());

        let (status, body) = call(
            &app,
            post_json(
                "/auth/register",
                json!({"name": "X", "email": "fern@example.com", "password": "pw", "role": "admin"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Email already registered");
    }

    #[tokio::test]
    async fn extra_body_fields_are_ignored() {
        let app = app();
        let (status, body) = call(
            &app,
            post_json(
                "/auth/register",
                json!({
                    "name": "A",
                    "email": "a@example.com",
                    "password": "pw",
                    "role": "farmer",
                    "phone": "123",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, _) = call(
            &app,
            post_json(
                "/auth/login",
                json!({"email": "a@example.com", "password": "pw", "remember": true}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn extractor_rejections_use_detail_body() {
        let app = app();

        let req = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string(), "{body}");

        let (status, body) = call(
            &app,
            post_json("/auth/login", json!({"email": "a@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string(), "{body}");

        let (status, body) = call(&app, get("/messages")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn bad_role_and_bad_credentials() {
        let app = app();
        let (status, body) = call(
            &app,
            post_json(
                "/auth/register",
                json!({"name": "G", "email": "g@example.com", "password": "pw", "role": "gardener"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid role");

        let (status, body) = call(
            &app,
            post_json("/auth/login", json!({"email": "g@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid credentials");
    }

    #[tokio::test]
    async fn messaging_round() {
        let app = app();
        let farmer = register(&app, "F", "f@example.com", "farmer").await;
        let supplier = register(&app, "S", "s@example.com", "supplier").await;

        let (status, body) = call(
            &app,
            post_json(
                "/messages",
                json!({"sender_id": farmer, "receiver_id": supplier, "content": "hello"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Message sent");
        let message_id = body["id"].clone();

        let (status, body) =
            call(&app, get(&format!("/messages?user_id={}&peer_id={}", supplier, farmer))).await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], message_id);
        assert_eq!(messages[0]["sender_id"], farmer);
        assert_eq!(messages[0]["read"], false);

        let (status, body) = call(
            &app,
            post_json(
                "/messages",
                json!({"sender_id": farmer, "receiver_id": "nope", "content": "hello"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid user id");

        let (status, _) = call(
            &app,
            post_json(
                "/messages",
                json!({
                    "sender_id": farmer,
                    "receiver_id": uuid::Uuid::new_v4().to_string(),
                    "content": "hello",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_routes_require_key() {
        let app = app();
        let id = register(&app, "A", "a@example.com", "supplier").await;

        let (status, _) = call(&app, get("/admin/accounts")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, with_admin(get("/admin/accounts"), "wrong")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, with_admin(get("/admin/accounts"), ADMIN_KEY)).await;
        assert_eq!(status, StatusCode::OK);
        let accounts = body["accounts"].as_array().unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].get("password_hash").is_none());

        let toggle = |active: bool| {
            with_admin(
                post_json("/admin/toggle-active", json!({"account_id": id, "active": active})),
                ADMIN_KEY,
            )
        };

        let (status, body) = call(&app, toggle(false)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Status updated");

        let (status, body) = call(
            &app,
            post_json("/auth/login", json!({"email": "a@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Account is deactivated");

        let (status, _) = call(&app, toggle(true)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            with_admin(
                post_json("/admin/toggle-active", json!({"account_id": "bad", "active": true})),
                ADMIN_KEY,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            with_admin(
                post_json(
                    "/admin/toggle-active",
                    json!({"account_id": uuid::Uuid::new_v4().to_string(), "active": true}),
                ),
                ADMIN_KEY,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Account not found");
    }

    #[tokio::test]
    async fn banner_and_health() {
        let app = app();
        let (status, body) = call(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Farmer-Supplier Communication API");

        let (status, body) = call(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
        let tables: Vec<&str> = body["tables"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t.as_str())
            .collect();
        assert!(tables.contains(&"accounts"));
        assert!(tables.contains(&"messages"));
    }
}
