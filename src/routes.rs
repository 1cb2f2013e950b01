// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, results, test_session},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, tests, results).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, services).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let test_routes = Router::new()
        .route("/{exam_type}/start", post(test_session::start_test))
        .route("/current", get(test_session::current_question))
        .route("/answer", post(test_session::submit_answer))
        .route("/finish", post(test_session::finish_test));

    // Everything a signed-in user does goes through the auth middleware.
    let protected_routes = Router::new()
        .nest("/api/tests", test_routes)
        .route("/api/results/{id}", get(results::view_result))
        .route("/api/history", get(results::list_history))
        .route("/api/dashboard", get(results::dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/api/exam-types", get(test_session::list_exam_types))
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{Config, SessionBackend},
        store::testutil::memory_pool,
    };

    async fn app() -> Router {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "router_test_secret".to_string(),
            jwt_expiration: 600,
            rust_log: "error".to_string(),
            port: 0,
            session_backend: SessionBackend::Memory,
            session_ttl_secs: None,
            shuffle_seed: None,
            seed_sample_questions: false,
        };
        create_router(AppState::new(memory_pool().await, config))
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app().await;
        for (method, uri) in [
            ("POST", "/api/tests/ICFES/start"),
            ("GET", "/api/tests/current"),
            ("POST", "/api/tests/finish"),
            ("GET", "/api/results/1"),
            ("GET", "/api/history"),
            ("GET", "/api/dashboard"),
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found_without_a_token() {
        let app = app().await;
        for uri in ["/random_path_that_does_not_exist", "/api/nope"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn exam_types_are_public() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/exam-types")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let types: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(types, vec!["ICFES", "SaberPro"]);
    }
}
