// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Name of the exam whose subjects can be combined into a mock attempt.
pub const JAMB_EXAM_NAME: &str = "JAMB";

/// A JAMB mock is always assembled from exactly this many subjects.
pub const JAMB_SUBJECT_COUNT: usize = 4;

/// Per-subject question cap for English papers in a JAMB mock.
pub const ENGLISH_QUESTION_CAP: usize = 60;

/// Per-subject question cap for every other subject in a JAMB mock.
pub const DEFAULT_QUESTION_CAP: usize = 40;

/// Exam types inserted on first start: (name, description).
pub const SEED_EXAMS: [(&str, &str); 3] = [
    ("JAMB", "Joint Admissions and Matriculation Board"),
    ("WAEC", "West African Examinations Council"),
    ("NECO", "National Examination Council"),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of a login token, in seconds.
    pub jwt_expiration: u64,
    /// Lifetime of an exam-session token, in seconds.
    pub attempt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://exam_data.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let attempt_expiration = env::var("ATTEMPT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_800);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            attempt_expiration,
            rust_log,
            admin_username,
            admin_password,
            port,
        }
    }
}
