// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, catalog, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, exams, quiz, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:5000".parse().expect("valid origin"),
            "http://127.0.0.1:5000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(quiz::SESSION_HEADER),
        ]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let exam_routes = Router::new()
        .route("/", get(catalog::list_exams))
        .route("/{id}/subjects", get(catalog::list_exam_subjects))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let quiz_routes = Router::new()
        .route("/subjects/{id}/attempt", post(quiz::start_subject_attempt))
        .route("/jamb/attempt", post(quiz::start_jamb_attempt))
        .route("/submit", post(quiz::submit_answers))
        .route("/results", get(quiz::get_results))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/exams", get(admin::list_exams).post(admin::create_exam))
        .route(
            "/exams/{id}",
            put(admin::update_exam).delete(admin::delete_exam),
        )
        .route(
            "/subjects",
            get(admin::list_subjects).post(admin::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(admin::get_subject)
                .put(admin::update_subject)
                .delete(admin::delete_subject),
        )
        .route(
            "/subjects/{id}/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/subjects/{id}/questions/import",
            post(admin::import_questions),
        )
        .route(
            "/questions/{id}",
            get(admin::get_question)
                .put(admin::update_question)
                .delete(admin::delete_question),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
