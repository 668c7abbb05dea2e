// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::attempt::{
        AttemptResponse, AttemptState, CompositeAttemptRequest, SessionClaims,
        SubmitAnswersRequest,
    },
    services::{
        assembler::{self, AssembledAttempt, SubjectSelection},
        scorer,
    },
    state::AppState,
    utils::jwt::{Claims, expires_in, sign_token, verify_token},
};

/// Header carrying the client-held exam-session token.
pub const SESSION_HEADER: &str = "x-exam-session";

/// Decodes the caller's exam session. No header means nothing was started.
fn read_session(
    headers: &HeaderMap,
    claims: &Claims,
    config: &Config,
) -> Result<AttemptState, AppError> {
    let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return Ok(AttemptState::NotStarted);
    };

    let session: SessionClaims = verify_token(token, &config.jwt_secret)
        .map_err(|_| AppError::AuthError("Invalid or expired exam session".to_string()))?;

    if session.sub != claims.sub {
        return Err(AppError::AuthError(
            "Exam session belongs to another user".to_string(),
        ));
    }

    Ok(session.attempt)
}

/// Signs the caller's new exam-session state.
fn write_session(
    attempt: AttemptState,
    claims: &Claims,
    config: &Config,
) -> Result<String, AppError> {
    let session = SessionClaims {
        sub: claims.sub.clone(),
        exp: expires_in(config.attempt_expiration)?,
        attempt,
    };
    sign_token(&session, &config.jwt_secret)
}

fn attempt_response(
    assembled: AssembledAttempt,
    claims: &Claims,
    config: &Config,
) -> Result<AttemptResponse, AppError> {
    let AssembledAttempt { attempt, questions } = assembled;
    let subject_label = attempt.subject_label.clone();
    let total_questions = attempt.total_questions();
    let session = write_session(AttemptState::Assembled(attempt), claims, config)?;

    Ok(AttemptResponse {
        session,
        subject_label,
        total_questions,
        questions,
    })
}

/// Starts an exam over every question of one subject.
///
/// Any previous attempt held by the client is replaced.
pub async fn start_subject_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let assembled = assembler::assemble(&state.pool, SubjectSelection::Single(subject_id)).await?;
    Ok(Json(attempt_response(assembled, &claims, &state.config)?))
}

/// Starts a JAMB mock exam from exactly four JAMB subjects.
pub async fn start_jamb_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CompositeAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let assembled =
        assembler::assemble(&state.pool, SubjectSelection::Jamb(req.subject_ids)).await?;
    Ok(Json(attempt_response(assembled, &claims, &state.config)?))
}

/// Grades the served questions and moves the session to `Submitted`.
///
/// The session keeps only the served ids and answers; the report is rebuilt
/// when it is read.
pub async fn submit_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = read_session(&headers, &claims, &state.config)?;
    let report = scorer::score(&state.pool, session.assembled()?, &req.answers).await?;

    let session = session.submit(req.answers, scorer::new_receipt())?;
    let session = write_session(session, &claims, &state.config)?;

    Ok(Json(json!({
        "session": session,
        "subject_label": report.subject_label,
        "score": report.score,
        "total_questions": report.total_questions,
    })))
}

/// Hands out the latest report once; the returned session no longer holds it.
pub async fn get_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let no_results = || AppError::NotFound("No recent exam results found.".to_string());

    let mut session = read_session(&headers, &claims, &state.config)?;
    let submission = session.take_submission().ok_or_else(no_results)?;

    let report = scorer::score(&state.pool, &submission.attempt, &submission.answers).await?;
    if !scorer::redeem_receipt(&state.pool, &submission.receipt, &claims.sub).await? {
        return Err(no_results());
    }

    Ok(Json(json!({
        "session": write_session(session, &claims, &state.config)?,
        "report": report,
    })))
}
