// src/services/scorer.rs
//
// Scorer: grades exactly the questions served in an attempt.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        attempt::{Attempt, QuestionResult, Report},
        question::Question,
    },
    services::catalog,
};

/// Grades an attempt against the answer keys.
///
/// Answers are compared exactly: only the upper-case letter stored as the key
/// counts. Unanswered questions are wrong. Every served id must have a key.
pub fn grade(
    attempt: &Attempt,
    keys: &HashMap<i64, Question>,
    answers: &HashMap<i64, String>,
) -> Result<Report, AppError> {
    let mut results = Vec::with_capacity(attempt.total_questions());
    let mut score = 0;

    for id in attempt.served_ids() {
        let question = keys.get(&id).ok_or_else(|| {
            AppError::Conflict(format!(
                "Question {} is no longer available; please start a new exam.",
                id
            ))
        })?;

        let user_answer = answers.get(&id).cloned();
        let is_correct = user_answer.as_deref() == Some(question.correct_answer.as_str());
        if is_correct {
            score += 1;
        }

        results.push(QuestionResult {
            question_id: id,
            question_text: question.question_text.clone(),
            options: question.options(),
            user_answer,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            explanation: question.explanation.clone(),
        });
    }

    Ok(Report {
        subject_label: attempt.subject_label.clone(),
        score,
        total_questions: results.len(),
        started_at: attempt.started_at,
        results,
    })
}

/// Loads the answer keys for the served questions and grades the attempt.
pub async fn score(
    pool: &SqlitePool,
    attempt: &Attempt,
    answers: &HashMap<i64, String>,
) -> Result<Report, AppError> {
    let served: Vec<i64> = attempt.served_ids().collect();
    let keys: HashMap<i64, Question> = catalog::questions_by_ids(pool, &served)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let report = grade(attempt, &keys, answers)?;
    tracing::info!(
        "Scored '{}': {}/{}",
        report.subject_label,
        report.score,
        report.total_questions
    );
    Ok(report)
}

/// Fresh identifier for a submitted attempt.
pub fn new_receipt() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}

/// Marks a submission's report as read.
///
/// Returns `false` when the receipt was already redeemed, so a replayed
/// session token cannot show the same report twice.
pub async fn redeem_receipt(
    pool: &SqlitePool,
    receipt: &str,
    username: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query("INSERT INTO redeemed_reports (receipt, username) VALUES (?, ?)")
        .bind(receipt)
        .bind(username)
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!("Report {} for '{}' was already read", receipt, username);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
