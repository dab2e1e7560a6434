use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::QuestionOptions;
use crate::db::types::{AnswerOption, Subject};
use crate::repositories::{admin, questions};

/// One-time store initialization: admin credentials and the default
/// 50-question bank. Both steps are no-ops when data is already present.
pub async fn run(state: &AppState) -> Result<(), sqlx::Error> {
    ensure_admin_credentials(state).await?;
    seed_default_questions(state).await?;
    Ok(())
}

async fn ensure_admin_credentials(state: &AppState) -> Result<(), sqlx::Error> {
    if admin::get(state.db()).await?.is_some() {
        return Ok(());
    }
    let settings = state.settings().admin();
    admin::create(state.db(), &settings.admin_login, &settings.admin_password, now_utc()).await?;
    tracing::info!(login = %settings.admin_login, "Admin credentials initialized");
    Ok(())
}

/// Seed the fixed default bank: algebra 1-12, geometry 13-20, physics 21-36,
/// english 37-50.
async fn seed_default_questions(state: &AppState) -> Result<(), sqlx::Error> {
    if questions::count(state.db()).await? > 0 {
        return Ok(());
    }

    let now = now_utc();
    for number in 1..=50i64 {
        let seed = default_question(number);
        questions::create(
            state.db(),
            questions::CreateQuestion {
                id: &Uuid::new_v4().to_string(),
                number,
                subject: seed.subject,
                text: &seed.text,
                formula: seed.formula.as_deref(),
                options: &seed.options,
                correct_answer: seed.correct_answer,
                explanation: Some(&seed.explanation),
                image: None,
                created: now,
                updated: now,
            },
        )
        .await?;
    }

    tracing::info!("Default question bank seeded");
    Ok(())
}

struct SeedQuestion {
    subject: Subject,
    text: String,
    formula: Option<String>,
    options: QuestionOptions,
    correct_answer: AnswerOption,
    explanation: String,
}

fn default_question(number: i64) -> SeedQuestion {
    match number {
        1..=12 => SeedQuestion {
            subject: Subject::Algebra,
            text: format!("Алгебраический вопрос {number}"),
            formula: Some(format!("x + {number} = {}", number + 5)),
            options: QuestionOptions {
                a: "5".to_string(),
                b: "6".to_string(),
                c: "7".to_string(),
                d: "8".to_string(),
            },
            correct_answer: AnswerOption::A,
            explanation: "Решение: x = 5".to_string(),
        },
        13..=20 => SeedQuestion {
            subject: Subject::Geometry,
            text: format!("Геометрический вопрос {}", number - 12),
            formula: Some("S = πr²".to_string()),
            options: QuestionOptions {
                a: "4π".to_string(),
                b: "9π".to_string(),
                c: "16π".to_string(),
                d: "25π".to_string(),
            },
            correct_answer: AnswerOption::C,
            explanation: "При радиусе 4, площадь равна 16π".to_string(),
        },
        21..=36 => {
            let mass = number - 20;
            SeedQuestion {
                subject: Subject::Physics,
                text: format!("Физический вопрос {mass}"),
                formula: Some("F = ma".to_string()),
                options: QuestionOptions {
                    a: format!("{} Н", mass * 2),
                    b: format!("{} Н", mass * 3),
                    c: format!("{} Н", mass * 4),
                    d: format!("{} Н", mass * 5),
                },
                correct_answer: AnswerOption::B,
                explanation: format!(
                    "При массе {mass} кг и ускорении 3 м/с², сила равна {} Н",
                    mass * 3
                ),
            }
        }
        _ => SeedQuestion {
            subject: Subject::English,
            text: "Choose the correct form: \"I ___ to school every day.\"".to_string(),
            formula: None,
            options: QuestionOptions {
                a: "go".to_string(),
                b: "goes".to_string(),
                c: "going".to_string(),
                d: "went".to_string(),
            },
            correct_answer: AnswerOption::A,
            explanation: "Present Simple с местоимением \"I\" требует базовую форму глагола"
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_context;

    #[test]
    fn bank_partitions_by_subject() {
        let by_subject = |subject: Subject| {
            (1..=50).filter(|n| default_question(*n).subject == subject).count()
        };
        assert_eq!(by_subject(Subject::Algebra), 12);
        assert_eq!(by_subject(Subject::Geometry), 8);
        assert_eq!(by_subject(Subject::Physics), 16);
        assert_eq!(by_subject(Subject::English), 14);
    }

    #[test]
    fn correct_answers_follow_the_subject() {
        assert_eq!(default_question(5).correct_answer, AnswerOption::A);
        assert_eq!(default_question(15).correct_answer, AnswerOption::C);
        assert_eq!(default_question(30).correct_answer, AnswerOption::B);
        assert_eq!(default_question(45).correct_answer, AnswerOption::A);
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let ctx = setup_test_context().await;
        assert_eq!(questions::count(ctx.state.db()).await.unwrap(), 50);

        // Running it again adds nothing and keeps the credentials row.
        run(&ctx.state).await.unwrap();
        assert_eq!(questions::count(ctx.state.db()).await.unwrap(), 50);
        let credentials = admin::get(ctx.state.db()).await.unwrap().expect("seeded admin");
        assert_eq!(credentials.login, "admin");
    }
}
