use serde::{Deserialize, Serialize};
use sqlx::Type;

/// The fixed set of exam topics. Question banks and result breakdowns are
/// always partitioned over exactly these four subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Subject {
    Algebra,
    Geometry,
    Physics,
    English,
}

impl Subject {
    pub const ALL: [Subject; 4] =
        [Subject::Algebra, Subject::Geometry, Subject::Physics, Subject::English];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Algebra => "algebra",
            Subject::Geometry => "geometry",
            Subject::Physics => "physics",
            Subject::English => "english",
        }
    }

    /// Display name shown to students.
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Algebra => "Алгебра",
            Subject::Geometry => "Геометрия",
            Subject::Physics => "Физика",
            Subject::English => "Английский",
        }
    }
}

/// Label of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] =
        [AnswerOption::A, AnswerOption::B, AnswerOption::C, AnswerOption::D];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}
