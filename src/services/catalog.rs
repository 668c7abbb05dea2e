// src/services/catalog.rs
//
// Catalog Store: exams, subjects and questions plus their integrity rules.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::SEED_EXAMS,
    error::{AppError, is_unique_violation},
    models::{
        exam::{CreateExamRequest, Exam, ExamOverview, UpdateExamRequest},
        question::{CreateQuestionRequest, Question, UpdateQuestionRequest},
        subject::{CreateSubjectRequest, Subject, SubjectSummary, UpdateSubjectRequest},
    },
};

const QUESTION_COLUMNS: &str = "id, subject_id, question_text, option_a, option_b, option_c, \
                                option_d, correct_answer, explanation";

/// Inserts the standard exam types when they are missing.
///
/// A unique violation means another process seeded first and is ignored.
pub async fn seed_exams(pool: &SqlitePool) -> Result<(), AppError> {
    for (name, description) in SEED_EXAMS {
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM exams WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

        if exists.is_some() {
            continue;
        }

        match sqlx::query("INSERT INTO exams (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await
        {
            Ok(_) => tracing::info!("Seeded exam '{}'", name),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("Exam '{}' already exists, skipping seed", name)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Exams
// ---------------------------------------------------------------------------

pub async fn list_exams(pool: &SqlitePool) -> Result<Vec<Exam>, AppError> {
    let exams = sqlx::query_as::<_, Exam>("SELECT id, name, description FROM exams ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exams: {:?}", e);
            AppError::from(e)
        })?;
    Ok(exams)
}

pub async fn get_exam(pool: &SqlitePool, id: i64) -> Result<Exam, AppError> {
    sqlx::query_as::<_, Exam>("SELECT id, name, description FROM exams WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))
}

pub async fn find_exam_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Exam>, AppError> {
    let exam = sqlx::query_as::<_, Exam>("SELECT id, name, description FROM exams WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(exam)
}

/// Every exam with its subjects (ordered by name) and their question counts.
pub async fn exam_overview(pool: &SqlitePool) -> Result<Vec<ExamOverview>, AppError> {
    let exams = list_exams(pool).await?;
    let summaries = list_subject_summaries(pool, None).await?;

    Ok(exams
        .into_iter()
        .map(|exam| {
            let subjects = summaries
                .iter()
                .filter(|s| s.exam_id == exam.id)
                .cloned()
                .collect();
            ExamOverview { exam, subjects }
        })
        .collect())
}

pub async fn create_exam(pool: &SqlitePool, req: CreateExamRequest) -> Result<Exam, AppError> {
    let req = CreateExamRequest {
        name: req.name.trim().to_string(),
        description: req.description.map(|d| d.trim().to_string()),
    };
    req.validate()?;

    let id = sqlx::query("INSERT INTO exams (name, description) VALUES (?, ?)")
        .bind(&req.name)
        .bind(&req.description)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Exam '{}' already exists", req.name))
            } else {
                tracing::error!("Failed to create exam: {:?}", e);
                AppError::from(e)
            }
        })?
        .last_insert_rowid();

    Ok(Exam {
        id,
        name: req.name,
        description: req.description,
    })
}

pub async fn update_exam(
    pool: &SqlitePool,
    id: i64,
    req: UpdateExamRequest,
) -> Result<Exam, AppError> {
    let req = UpdateExamRequest {
        name: req.name.map(|n| n.trim().to_string()),
        description: req.description.map(|d| d.trim().to_string()),
    };
    req.validate()?;

    let current = get_exam(pool, id).await?;
    let name = req.name.unwrap_or(current.name);
    let description = req.description.or(current.description);

    sqlx::query("UPDATE exams SET name = ?, description = ? WHERE id = ?")
        .bind(&name)
        .bind(&description)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Exam '{}' already exists", name))
            } else {
                tracing::error!("Failed to update exam: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok(Exam { id, name, description })
}

/// Deletes an exam together with its subjects and their questions, children first.
pub async fn delete_exam(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let removed_questions = sqlx::query(
        "DELETE FROM questions WHERE subject_id IN (SELECT id FROM subjects WHERE exam_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query("DELETE FROM subjects WHERE exam_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM exams WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    tx.commit().await?;
    tracing::info!("Deleted exam {} and {} questions", id, removed_questions);
    Ok(())
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Subjects with question counts, ordered by exam then name.
pub async fn list_subject_summaries(
    pool: &SqlitePool,
    exam_id: Option<i64>,
) -> Result<Vec<SubjectSummary>, AppError> {
    let summaries = sqlx::query_as::<_, SubjectSummary>(
        r#"
        SELECT s.id, s.name, s.exam_id, COUNT(q.id) AS question_count
        FROM subjects s
        LEFT JOIN questions q ON q.subject_id = s.id
        WHERE (?1 IS NULL OR s.exam_id = ?1)
        GROUP BY s.id, s.name, s.exam_id
        ORDER BY s.exam_id, s.name
        "#,
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list subjects: {:?}", e);
        AppError::from(e)
    })?;
    Ok(summaries)
}

pub async fn get_subject(pool: &SqlitePool, id: i64) -> Result<Subject, AppError> {
    sqlx::query_as::<_, Subject>("SELECT id, name, exam_id FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))
}

pub async fn create_subject(
    pool: &SqlitePool,
    req: CreateSubjectRequest,
) -> Result<Subject, AppError> {
    let req = CreateSubjectRequest {
        exam_id: req.exam_id,
        name: req.name.trim().to_string(),
    };
    if req.name.is_empty() {
        return Err(AppError::BadRequest(
            "Both Exam Type and Subject Name are required.".to_string(),
        ));
    }
    req.validate()?;

    let exam = get_exam(pool, req.exam_id).await?;

    let id = sqlx::query("INSERT INTO subjects (name, exam_id) VALUES (?, ?)")
        .bind(&req.name)
        .bind(exam.id)
        .execute(pool)
        .await
        .map_err(|e| subject_write_error(e, &req.name, &exam.name))?
        .last_insert_rowid();

    tracing::info!("Subject '{}' added to {}", req.name, exam.name);
    Ok(Subject {
        id,
        name: req.name,
        exam_id: exam.id,
    })
}

pub async fn update_subject(
    pool: &SqlitePool,
    id: i64,
    req: UpdateSubjectRequest,
) -> Result<Subject, AppError> {
    let req = UpdateSubjectRequest {
        name: req.name.trim().to_string(),
    };
    req.validate()?;

    let subject = get_subject(pool, id).await?;
    let exam = get_exam(pool, subject.exam_id).await?;

    sqlx::query("UPDATE subjects SET name = ? WHERE id = ?")
        .bind(&req.name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| subject_write_error(e, &req.name, &exam.name))?;

    Ok(Subject {
        id,
        name: req.name,
        exam_id: subject.exam_id,
    })
}

/// Deletes a subject's questions, then the subject, in one transaction.
pub async fn delete_subject(pool: &SqlitePool, id: i64) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;

    let removed_questions = sqlx::query("DELETE FROM questions WHERE subject_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    tx.commit().await?;
    tracing::info!("Deleted subject {} and {} questions", id, removed_questions);
    Ok(removed_questions)
}

fn subject_write_error(e: sqlx::Error, name: &str, exam_name: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict(format!("Subject '{}' already exists for {}.", name, exam_name))
    } else {
        tracing::error!("Failed to write subject: {:?}", e);
        AppError::from(e)
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Questions of a subject, newest first.
pub async fn list_questions(pool: &SqlitePool, subject_id: i64) -> Result<Vec<Question>, AppError> {
    get_subject(pool, subject_id).await?;

    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE subject_id = ? ORDER BY id DESC"
    ))
    .bind(subject_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::from(e)
    })?;
    Ok(questions)
}

/// Question ids of a subject in insertion order.
pub async fn question_ids_for_subject(
    pool: &SqlitePool,
    subject_id: i64,
) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM questions WHERE subject_id = ? ORDER BY id",
    )
    .bind(subject_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Fetches the given questions. Missing ids are simply absent from the result.
pub async fn questions_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<Question>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id IN ("
    ));
    let mut separated = builder.separated(",");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let questions = builder
        .build_query_as::<Question>()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions by id: {:?}", e);
            AppError::from(e)
        })?;
    Ok(questions)
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> Result<Question, AppError> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))
}

pub async fn create_question(
    pool: &SqlitePool,
    subject_id: i64,
    req: CreateQuestionRequest,
) -> Result<Question, AppError> {
    let req = req.normalized();
    req.validate()?;
    get_subject(pool, subject_id).await?;

    let id = insert_question(pool, subject_id, &req).await.map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Question {
        id,
        subject_id,
        question_text: req.question_text,
        option_a: req.option_a,
        option_b: req.option_b,
        option_c: req.option_c,
        option_d: req.option_d,
        correct_answer: req.correct_answer,
        explanation: req.explanation,
    })
}

/// Inserts an already validated question, returning its id.
pub(crate) async fn insert_question<'e, E>(
    executor: E,
    subject_id: i64,
    req: &CreateQuestionRequest,
) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO questions
        (question_text, option_a, option_b, option_c, option_d, correct_answer, explanation, subject_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.question_text)
    .bind(&req.option_a)
    .bind(&req.option_b)
    .bind(&req.option_c)
    .bind(&req.option_d)
    .bind(&req.correct_answer)
    .bind(&req.explanation)
    .bind(subject_id)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_question(
    pool: &SqlitePool,
    id: i64,
    req: UpdateQuestionRequest,
) -> Result<Question, AppError> {
    let req = req.normalized();
    req.validate()?;

    if req.is_empty() {
        return get_question(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    let columns = [
        ("question_text", req.question_text),
        ("option_a", req.option_a),
        ("option_b", req.option_b),
        ("option_c", req.option_c),
        ("option_d", req.option_d),
        ("correct_answer", req.correct_answer),
    ];
    for (column, value) in columns {
        if let Some(value) = value {
            separated.push(format!("{column} = "));
            separated.push_bind_unseparated(value);
        }
    }

    // A blank explanation clears it.
    if let Some(explanation) = req.explanation {
        separated.push("explanation = ");
        separated.push_bind_unseparated(Some(explanation).filter(|e| !e.is_empty()));
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(pool).await.map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    get_question(pool, id).await
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(())
}
