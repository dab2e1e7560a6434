use crate::db::models::TestResult;
use crate::db::types::Subject;

/// Study advice derived from a result. Presentation text only; nothing here
/// feeds back into the scored record.
pub fn recommendations(result: &TestResult) -> Vec<String> {
    let mut lines = Vec::new();

    if result.percentage >= 80 {
        lines.push("🎉 Excellent result! You showed a high level of knowledge.".to_string());
    } else if result.percentage >= 60 {
        lines.push("👍 Good result! There are areas for improvement.".to_string());
    } else {
        lines.push("📚 We recommend spending more time studying the material.".to_string());
    }

    for subject in Subject::ALL {
        let correct = result.subject_scores.0.get(&subject).copied().unwrap_or(0);
        let total = result.subject_totals.0.get(&subject).copied().unwrap_or(0);
        if total > 0 && (correct as f64 / total as f64) * 100.0 < 50.0 {
            lines.push(format!("📖 Pay more attention to {}.", subject.as_str()));
        }
    }

    lines
}

/// Achievement badges earned over a student's result history.
pub fn achievements(results: &[TestResult]) -> Vec<String> {
    let Some(best) = results.iter().max_by_key(|result| result.total_score) else {
        return Vec::new();
    };

    let mut earned = Vec::new();
    if best.total_score >= 40 {
        earned.push("🏆 Excellent Student - more than 80% correct answers".to_string());
    }
    if best.total_score >= 35 {
        earned.push("🥇 Good Student - more than 70% correct answers".to_string());
    }
    if results.len() >= 5 {
        earned.push("📚 Active Learner - completed 5+ tests".to_string());
    }
    earned.push("🎯 First Test - completed first assessment".to_string());
    earned
}
