use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    api::http::{auth as auth_http, comments as comments_http, roadmap as roadmap_http},
    app::{config::RateLimitSettings, middleware::security_headers, state::AppState},
    auth::middleware::auth_middleware,
    error::AppError,
    telemetry::request_logging_middleware,
};

const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    pub cors_origin: Option<String>,
    pub rate_limit: Option<RateLimitSettings>,
}

pub fn build_router(state: AppState, options: RouterOptions) -> Result<Router, AppError> {
    let allow_origin = match options.cors_origin.as_deref() {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>().map_err(|err| {
            AppError::Internal(format!("invalid CORS_ORIGIN {}: {}", origin, err))
        })?),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let public_routes = Router::new()
        .route("/api/auth/signup", post(auth_http::signup_handle))
        .route("/api/auth/login", post(auth_http::login_handle))
        .route("/api/roadmap", get(roadmap_http::list_roadmap_handle))
        .route(
            "/api/roadmap/{item_id}",
            get(roadmap_http::get_roadmap_item_handle),
        )
        .route(
            "/api/roadmap/{item_id}/comments",
            get(comments_http::list_item_comments_handle),
        );

    let authenticated_routes = Router::new()
        .route(
            "/api/roadmap/{item_id}/upvote",
            post(roadmap_http::upvote_roadmap_item_handle),
        )
        .route(
            "/api/roadmap/{item_id}/comments",
            post(comments_http::create_item_comment_handle),
        )
        .route(
            "/api/comments/{comment_id}",
            put(comments_http::update_comment_handle).delete(comments_http::delete_comment_handle),
        )
        .route(
            "/api/admin/roadmap/upload-json",
            post(roadmap_http::import_roadmap_handle),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(authenticated_routes);

    // Needs the peer address, so the server must be started with connect info.
    if let Some(settings) = options.rate_limit {
        let governor_config = GovernorConfigBuilder::default()
            .period(settings.replenish_every)
            .burst_size(settings.burst)
            .finish()
            .ok_or_else(|| AppError::Internal("invalid rate limit settings".to_string()))?;
        let governor_config = Arc::new(governor_config);

        let limiter = governor_config.limiter().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.retain_recent();
            }
        });

        router = router.layer(GovernorLayer {
            config: governor_config,
        });
    }

    Ok(router
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt::JwtConfig,
        dto::{
            auth::AuthResponse,
            comments::{CommentThreadResponse, DeleteCommentResponse},
            roadmap::ImportRoadmapResponse,
        },
        models::comments::Comment,
        repositories::Store,
    };
    use axum::{
        body::Body,
        http::{Request, Response, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        store: Store,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Store::memory();
            let jwt_config = JwtConfig {
                secret: "router-test-secret".to_string(),
                expiration_hours: 1,
                issuer: None,
                audience: None,
            };
            let state = AppState::new(store.clone(), jwt_config);
            let router = build_router(state, RouterOptions::default()).unwrap();
            Self { router, store }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> Response<Body> {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(value) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };
            self.router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap()
        }

        async fn signup(&self, email: &str) -> AuthResponse {
            let response = self
                .send(
                    Method::POST,
                    "/api/auth/signup",
                    None,
                    Some(json!({ "email": email, "password": "password123" })),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            read_json(response).await
        }

        async fn seed_item(&self, token: &str) -> Uuid {
            let response = self
                .send(
                    Method::POST,
                    "/api/admin/roadmap/upload-json",
                    Some(token),
                    Some(json!({
                        "roadmapItems": [{
                            "title": "Dark mode",
                            "description": "Follow the OS theme",
                            "category": "Feature",
                            "status": "In Progress"
                        }]
                    })),
                )
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            let body: ImportRoadmapResponse = read_json(response).await;
            body.item_ids[0]
        }

        async fn comment(
            &self,
            token: &str,
            item_id: Uuid,
            content: &str,
            parent: Option<Uuid>,
        ) -> Response<Body> {
            self.send(
                Method::POST,
                &format!("/api/roadmap/{item_id}/comments"),
                Some(token),
                Some(json!({ "content": content, "parentCommentId": parent })),
            )
            .await
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn mutations_require_a_token() {
        let app = TestApp::new();

        let response = app
            .send(
                Method::POST,
                &format!("/api/roadmap/{}/comments", Uuid::new_v4()),
                None,
                Some(json!({ "content": "hi" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let response = app
            .send(
                Method::DELETE,
                &format!("/api/comments/{}", Uuid::new_v4()),
                Some("garbage"),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn comment_thread_lifecycle() {
        let app = TestApp::new();
        let u1 = app.signup("u1@example.com").await;
        let u2 = app.signup("u2@example.com").await;
        let item_id = app.seed_item(&u1.token).await;

        let response = app.comment(&u1.token, item_id, "Hello", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let root: Comment = read_json(response).await;
        assert_eq!(root.depth, 0);

        let response = app.comment(&u2.token, item_id, "Hi", Some(root.id)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let reply: Comment = read_json(response).await;
        assert_eq!(reply.depth, 1);

        let response = app.comment(&u1.token, item_id, "Deeper", Some(reply.id)).await;
        let deeper: Comment = read_json(response).await;
        assert_eq!(deeper.depth, 2);

        let response = app
            .send(
                Method::GET,
                &format!("/api/roadmap/{item_id}/comments"),
                None,
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let thread: CommentThreadResponse = read_json(response).await;
        assert_eq!(thread.total, 3);
        assert_eq!(thread.data.len(), 1);
        assert_eq!(thread.data[0].id, root.id);
        assert_eq!(thread.data[0].replies.len(), 1);
        assert_eq!(thread.data[0].replies[0].id, reply.id);
        assert_eq!(thread.data[0].replies[0].replies[0].id, deeper.id);

        let response = app
            .send(
                Method::PUT,
                &format!("/api/comments/{}", root.id),
                Some(&u2.token),
                Some(json!({ "content": "Not yours" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .send(
                Method::PUT,
                &format!("/api/comments/{}", root.id),
                Some(&u1.token),
                Some(json!({ "content": "Updated" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let edited: Comment = read_json(response).await;
        assert_eq!(edited.content, "Updated");

        let response = app
            .send(
                Method::DELETE,
                &format!("/api/comments/{}", root.id),
                Some(&u1.token),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let deleted: DeleteCommentResponse = read_json(response).await;
        assert_eq!(deleted.deleted_ids.len(), 3);

        let item = app.store.items.find_item(item_id).await.unwrap().unwrap();
        assert!(item.comment_ids.is_empty());
        let thread = app
            .send(
                Method::GET,
                &format!("/api/roadmap/{item_id}/comments"),
                None,
                None,
            )
            .await;
        let thread: CommentThreadResponse = read_json(thread).await;
        assert_eq!(thread.total, 0);
    }

    #[tokio::test]
    async fn depth_limit_and_validation_map_to_bad_request() {
        let app = TestApp::new();
        let user = app.signup("deep@example.com").await;
        let item_id = app.seed_item(&user.token).await;

        let mut parent = None;
        for level in 0..=3 {
            let response = app
                .comment(&user.token, item_id, &format!("level {level}"), parent)
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            let comment: Comment = read_json(response).await;
            parent = Some(comment.id);
        }

        let response = app.comment(&user.token, item_id, "too deep", parent).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"]["code"], "DEPTH_LIMIT");

        let response = app.comment(&user.token, item_id, &"x".repeat(301), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let stored = app
            .store
            .comments
            .list_comments_for_item(item_id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 4);
    }

    #[tokio::test]
    async fn malformed_requests_get_structured_bad_request() {
        let app = TestApp::new();
        let user = app.signup("shape@example.com").await;
        let item_id = app.seed_item(&user.token).await;

        let response = app
            .send(
                Method::POST,
                &format!("/api/roadmap/{item_id}/comments"),
                Some(&user.token),
                Some(json!({})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let response = app
            .send(
                Method::POST,
                &format!("/api/roadmap/{item_id}/comments"),
                Some(&user.token),
                Some(json!({ "content": 42 })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .send(
                Method::PUT,
                "/api/comments/not-a-uuid",
                Some(&user.token),
                Some(json!({ "content": "hi" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let response = app
            .send(Method::GET, "/api/roadmap/not-a-uuid", None, None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .send(Method::GET, "/api/roadmap?sort=loudest", None, None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let stored = app
            .store
            .comments
            .list_comments_for_item(item_id)
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn missing_resources_are_not_found() {
        let app = TestApp::new();
        let user = app.signup("nf@example.com").await;

        let response = app.comment(&user.token, Uuid::new_v4(), "hi", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .send(
                Method::GET,
                &format!("/api/roadmap/{}", Uuid::new_v4()),
                None,
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .send(
                Method::DELETE,
                &format!("/api/comments/{}", Uuid::new_v4()),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn roadmap_listing_and_upvotes() {
        let app = TestApp::new();
        let user = app.signup("voter@example.com").await;
        let item_id = app.seed_item(&user.token).await;

        let response = app
            .send(
                Method::POST,
                &format!("/api/roadmap/{item_id}/upvote"),
                Some(&user.token),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_json(response).await;
        assert_eq!(body, json!({ "upvotes": 1, "upvoted": true }));

        let response = app
            .send(
                Method::GET,
                "/api/roadmap?status=In%20Progress&sort=upvotes",
                None,
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let items: Value = read_json(response).await;
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["upvote_count"], 1);
        assert_eq!(items[0]["status"], "In Progress");

        let response = app
            .send(Method::GET, "/api/roadmap?category=Bug", None, None)
            .await;
        let items: Value = read_json(response).await;
        assert!(items.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_returns_token_and_rejects_bad_password() {
        let app = TestApp::new();
        let signed_up = app.signup("login@example.com").await;

        let response = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "login@example.com", "password": "password123" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: AuthResponse = read_json(response).await;
        assert_eq!(body.user_id, signed_up.user_id);

        let response = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "login@example.com", "password": "wrong-password" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .send(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({ "email": "login@example.com", "password": "password123" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = TestApp::new();
        let response = app.send(Method::GET, "/api/roadmap", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert!(response.headers().get("x-request-id").is_some());
    }
}
