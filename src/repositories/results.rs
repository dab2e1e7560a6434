use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::db::models::TestResult;

const COLUMNS: &str = "\
    id, student_id, student_name, student_class, total_score, total_questions, \
    percentage, subject_scores, subject_totals, test_duration_ms, answers, timestamp";

pub async fn list(pool: &SqlitePool) -> Result<Vec<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "SELECT {COLUMNS} FROM test_results ORDER BY timestamp"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_by_student(
    pool: &SqlitePool,
    student_id: &str,
) -> Result<Vec<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "SELECT {COLUMNS} FROM test_results WHERE student_id = ?1 ORDER BY timestamp"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_results").fetch_one(pool).await
}

pub async fn insert(pool: &SqlitePool, result: &TestResult) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO test_results (
            id, student_id, student_name, student_class, total_score, total_questions,
            percentage, subject_scores, subject_totals, test_duration_ms, answers, timestamp
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
    )
    .bind(&result.id)
    .bind(&result.student_id)
    .bind(&result.student_name)
    .bind(&result.student_class)
    .bind(result.total_score)
    .bind(result.total_questions)
    .bind(result.percentage)
    .bind(Json(&result.subject_scores.0))
    .bind(Json(&result.subject_totals.0))
    .bind(result.test_duration_ms)
    .bind(Json(&result.answers.0))
    .bind(result.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn replace_all(
    executor: &mut sqlx::SqliteConnection,
    results: &[TestResult],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM test_results").execute(&mut *executor).await?;
    for result in results {
        sqlx::query(
            "INSERT INTO test_results (
                id, student_id, student_name, student_class, total_score, total_questions,
                percentage, subject_scores, subject_totals, test_duration_ms, answers, timestamp
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        )
        .bind(&result.id)
        .bind(&result.student_id)
        .bind(&result.student_name)
        .bind(&result.student_class)
        .bind(result.total_score)
        .bind(result.total_questions)
        .bind(result.percentage)
        .bind(Json(&result.subject_scores.0))
        .bind(Json(&result.subject_totals.0))
        .bind(result.test_duration_ms)
        .bind(Json(&result.answers.0))
        .bind(result.timestamp)
        .execute(&mut *executor)
        .await?;
    }
    Ok(())
}
