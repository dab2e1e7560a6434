use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::db::models::{Question, QuestionOptions};
use crate::db::types::{AnswerOption, Subject};

const COLUMNS: &str = "\
    id, number, subject, subject_name, text, formula, options, \
    correct_answer, explanation, image, created, updated";

pub async fn list_ordered(pool: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions ORDER BY number"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions").fetch_one(pool).await
}

pub async fn next_number(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let max: Option<i64> =
        sqlx::query_scalar("SELECT MAX(number) FROM questions").fetch_one(pool).await?;
    Ok(max.unwrap_or(0) + 1)
}

pub struct CreateQuestion<'a> {
    pub id: &'a str,
    pub number: i64,
    pub subject: Subject,
    pub text: &'a str,
    pub formula: Option<&'a str>,
    pub options: &'a QuestionOptions,
    pub correct_answer: AnswerOption,
    pub explanation: Option<&'a str>,
    pub image: Option<&'a str>,
    pub created: time::OffsetDateTime,
    pub updated: time::OffsetDateTime,
}

pub async fn create(
    pool: &SqlitePool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, number, subject, subject_name, text, formula, options,
            correct_answer, explanation, image, created, updated
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.number)
    .bind(params.subject)
    .bind(params.subject.display_name())
    .bind(params.text)
    .bind(params.formula)
    .bind(Json(params.options))
    .bind(params.correct_answer)
    .bind(params.explanation)
    .bind(params.image)
    .bind(params.created)
    .bind(params.updated)
    .fetch_one(pool)
    .await
}

pub struct UpdateQuestion<'a> {
    pub text: Option<&'a str>,
    pub formula: Option<Option<&'a str>>,
    pub options: Option<&'a QuestionOptions>,
    pub correct_answer: Option<AnswerOption>,
    pub explanation: Option<Option<&'a str>>,
    pub image: Option<Option<&'a str>>,
    pub updated: time::OffsetDateTime,
}

/// Patch a stored question. `Option<Option<_>>` fields distinguish "leave as
/// is" (None) from "clear" (Some(None)).
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    params: UpdateQuestion<'_>,
) -> Result<Option<Question>, sqlx::Error> {
    let Some(existing) = find_by_id(pool, id).await? else {
        return Ok(None);
    };

    let text = params.text.unwrap_or(&existing.text);
    let formula = params.formula.unwrap_or(existing.formula.as_deref());
    let options = params.options.unwrap_or(&existing.options.0);
    let correct_answer = params.correct_answer.unwrap_or(existing.correct_answer);
    let explanation = params.explanation.unwrap_or(existing.explanation.as_deref());
    let image = params.image.unwrap_or(existing.image.as_deref());

    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            text = ?1, formula = ?2, options = ?3, correct_answer = ?4,
            explanation = ?5, image = ?6, updated = ?7
         WHERE id = ?8
         RETURNING {COLUMNS}"
    ))
    .bind(text)
    .bind(formula)
    .bind(Json(options))
    .bind(correct_answer)
    .bind(explanation)
    .bind(image)
    .bind(params.updated)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn replace_all(
    executor: &mut sqlx::SqliteConnection,
    questions: &[Question],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM questions").execute(&mut *executor).await?;
    for question in questions {
        sqlx::query(
            "INSERT INTO questions (
                id, number, subject, subject_name, text, formula, options,
                correct_answer, explanation, image, created, updated
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        )
        .bind(&question.id)
        .bind(question.number)
        .bind(question.subject)
        .bind(&question.subject_name)
        .bind(&question.text)
        .bind(question.formula.as_deref())
        .bind(Json(&question.options.0))
        .bind(question.correct_answer)
        .bind(question.explanation.as_deref())
        .bind(question.image.as_deref())
        .bind(question.created)
        .bind(question.updated)
        .execute(&mut *executor)
        .await?;
    }
    Ok(())
}
