// src/services/assembler.rs
//
// Session Assembler: builds the fixed question set of an attempt.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::{Rng, seq::SliceRandom};
use sqlx::SqlitePool;

use crate::{
    config::{DEFAULT_QUESTION_CAP, ENGLISH_QUESTION_CAP, JAMB_EXAM_NAME, JAMB_SUBJECT_COUNT},
    error::AppError,
    models::{
        attempt::{Attempt, AttemptSection},
        question::{PublicQuestion, Question},
        subject::Subject,
    },
    services::catalog,
};

/// What the student asked to sit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectSelection {
    Single(i64),
    Jamb(Vec<i64>),
}

/// An assembled attempt plus the questions to show, in serving order.
#[derive(Debug)]
pub struct AssembledAttempt {
    pub attempt: Attempt,
    pub questions: Vec<PublicQuestion>,
}

/// Per-subject question cap in a JAMB mock.
pub fn question_cap(subject_name: &str) -> usize {
    if subject_name.to_lowercase().contains("english") {
        ENGLISH_QUESTION_CAP
    } else {
        DEFAULT_QUESTION_CAP
    }
}

/// Uniform random draw without replacement of at most `cap` ids.
pub fn draw<R: Rng + ?Sized>(mut ids: Vec<i64>, cap: usize, rng: &mut R) -> Vec<i64> {
    ids.shuffle(rng);
    ids.truncate(cap);
    ids
}

/// Checks the shape of a JAMB selection before touching the catalog.
pub fn validate_jamb_selection(subject_ids: &[i64]) -> Result<(), AppError> {
    if subject_ids.len() != JAMB_SUBJECT_COUNT {
        return Err(AppError::BadRequest(format!(
            "Select exactly {} subjects for a JAMB mock exam (got {}).",
            JAMB_SUBJECT_COUNT,
            subject_ids.len()
        )));
    }

    let distinct: HashSet<i64> = subject_ids.iter().copied().collect();
    if distinct.len() != subject_ids.len() {
        return Err(AppError::BadRequest(
            "Each JAMB subject may only be selected once.".to_string(),
        ));
    }
    Ok(())
}

/// Builds an attempt for the selection.
pub async fn assemble(
    pool: &SqlitePool,
    selection: SubjectSelection,
) -> Result<AssembledAttempt, AppError> {
    let (subject_label, sections) = match selection {
        SubjectSelection::Single(subject_id) => {
            let section = single_subject_section(pool, subject_id).await?;
            (section.subject_name.clone(), vec![section])
        }
        SubjectSelection::Jamb(subject_ids) => jamb_sections(pool, &subject_ids).await?,
    };

    let attempt = Attempt {
        subject_label,
        sections,
        started_at: Utc::now(),
    };

    if attempt.total_questions() == 0 {
        return Err(AppError::NotFound(format!(
            "No questions available for {}.",
            attempt.subject_label
        )));
    }

    let served: Vec<i64> = attempt.served_ids().collect();
    let questions = ordered_questions(pool, &served).await?;

    tracing::info!(
        "Assembled attempt '{}' with {} questions",
        attempt.subject_label,
        questions.len()
    );

    Ok(AssembledAttempt {
        attempt,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    })
}

async fn single_subject_section(
    pool: &SqlitePool,
    subject_id: i64,
) -> Result<AttemptSection, AppError> {
    let subject = catalog::get_subject(pool, subject_id).await?;
    let question_ids = catalog::question_ids_for_subject(pool, subject.id).await?;

    if question_ids.is_empty() {
        return Err(AppError::NotFound(format!(
            "No questions available for {}.",
            subject.name
        )));
    }

    Ok(AttemptSection {
        subject_id: subject.id,
        subject_name: subject.name,
        question_ids,
    })
}

async fn jamb_sections(
    pool: &SqlitePool,
    subject_ids: &[i64],
) -> Result<(String, Vec<AttemptSection>), AppError> {
    validate_jamb_selection(subject_ids)?;

    let jamb = catalog::find_exam_by_name(pool, JAMB_EXAM_NAME)
        .await?
        .ok_or(AppError::NotFound("JAMB exam not found".to_string()))?;

    let mut subjects: Vec<Subject> = Vec::with_capacity(subject_ids.len());
    for id in subject_ids {
        let subject = catalog::get_subject(pool, *id).await?;
        if subject.exam_id != jamb.id {
            return Err(AppError::BadRequest(format!(
                "Subject '{}' is not a JAMB subject.",
                subject.name
            )));
        }
        subjects.push(subject);
    }

    let mut sections = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let ids = catalog::question_ids_for_subject(pool, subject.id).await?;
        let cap = question_cap(&subject.name);
        let question_ids = draw(ids, cap, &mut rand::rng());
        sections.push(AttemptSection {
            subject_id: subject.id,
            subject_name: subject.name,
            question_ids,
        });
    }

    let names: Vec<&str> = sections.iter().map(|s| s.subject_name.as_str()).collect();
    let label = format!("{} Mock ({})", JAMB_EXAM_NAME, names.join(", "));
    Ok((label, sections))
}

/// Loads the questions and returns them in the order of `ids`.
async fn ordered_questions(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Question>, AppError> {
    let mut by_id: HashMap<i64, Question> = catalog::questions_by_ids(pool, ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}
