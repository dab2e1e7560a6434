use sqlx::SqlitePool;

use crate::db::models::Student;

const COLUMNS: &str =
    "id, first_name, last_name, class_name, email, password, created, last_login";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students ORDER BY created"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE email = ?1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE email = ?1 AND password = ?2"
    ))
    .bind(email)
    .bind(password)
    .fetch_optional(pool)
    .await
}

pub struct CreateStudent<'a> {
    pub id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub class_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub created: time::OffsetDateTime,
    pub last_login: time::OffsetDateTime,
}

pub async fn create(pool: &SqlitePool, params: CreateStudent<'_>) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (
            id, first_name, last_name, class_name, email, password, created, last_login
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.class_name)
    .bind(params.email)
    .bind(params.password)
    .bind(params.created)
    .bind(params.last_login)
    .fetch_one(pool)
    .await
}

pub async fn touch_last_login(
    pool: &SqlitePool,
    id: &str,
    now: time::OffsetDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE students SET last_login = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(pool).await
}

pub async fn replace_all(
    executor: &mut sqlx::SqliteConnection,
    students: &[Student],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM students").execute(&mut *executor).await?;
    for student in students {
        sqlx::query(
            "INSERT INTO students (
                id, first_name, last_name, class_name, email, password, created, last_login
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        )
        .bind(&student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.class_name)
        .bind(&student.email)
        .bind(&student.password)
        .bind(student.created)
        .bind(student.last_login)
        .execute(&mut *executor)
        .await?;
    }
    Ok(())
}
