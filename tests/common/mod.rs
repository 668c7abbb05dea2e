// tests/common/mod.rs

#![allow(dead_code)]

use exam_portal::{
    config::Config,
    models::question::CreateQuestionRequest,
    routes,
    services::catalog,
    state::AppState,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub const ADMIN_USERNAME: &str = "EPS";
pub const ADMIN_PASSWORD: &str = "AdminEPS123";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Fresh in-memory database with the schema and seed exams applied.
pub async fn test_pool() -> SqlitePool {
    // One connection that never recycles keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    catalog::seed_exams(&pool).await.expect("Failed to seed exams");
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        attempt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        port: 0,
    }
}

/// Spawns the app on a random port.
pub async fn spawn_app() -> TestApp {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), test_config()).expect("Failed to build state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let resp: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");
        resp["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn student_token(&self) -> String {
        let name = format!("s_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        self.login(&name, "password123").await
    }

    pub async fn exam_id(&self, name: &str) -> i64 {
        catalog::find_exam_by_name(&self.pool, name)
            .await
            .unwrap()
            .expect("seeded exam")
            .id
    }
}

pub fn question(text: &str, answer: &str) -> CreateQuestionRequest {
    CreateQuestionRequest {
        question_text: text.to_string(),
        option_a: "Option A".to_string(),
        option_b: "Option B".to_string(),
        option_c: "Option C".to_string(),
        option_d: "Option D".to_string(),
        correct_answer: answer.to_string(),
        explanation: Some(format!("Because {}", answer)),
    }
}

/// Creates a subject with `count` questions whose answers cycle A..D.
pub async fn subject_with_questions(
    pool: &SqlitePool,
    exam_id: i64,
    name: &str,
    count: usize,
) -> i64 {
    let subject = catalog::create_subject(
        pool,
        exam_portal::models::subject::CreateSubjectRequest {
            exam_id,
            name: name.to_string(),
        },
    )
    .await
    .expect("Failed to create subject");

    let letters = ["A", "B", "C", "D"];
    for i in 0..count {
        catalog::create_question(
            pool,
            subject.id,
            question(&format!("{} question {}", name, i), letters[i % 4]),
        )
        .await
        .expect("Failed to create question");
    }
    subject.id
}
