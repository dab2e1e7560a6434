use crate::db::types::Subject;

/// Canned study-helper replies, keyed by subject keyword in the prompt.
const RESPONSES: [(Subject, &str); 4] = [
    (
        Subject::Algebra,
        "Algebra studies mathematical structures and operations. Key concepts include \
         variables, equations, and functions. Would you like to explore a specific example?",
    ),
    (
        Subject::Geometry,
        "Geometry studies shapes, sizes, and properties of figures in space. It includes \
         plane geometry (2D figures) and solid geometry (3D figures). Which topic interests you?",
    ),
    (
        Subject::Physics,
        "Physics studies natural phenomena and laws. Main branches: mechanics, \
         thermodynamics, electricity, optics. Which area would you like to learn more about?",
    ),
    (
        Subject::English,
        "English is an international language of communication. Important to study grammar, \
         vocabulary, and practice speaking. What aspect of English interests you?",
    ),
];

/// Answer a free-form study question with the first subject reply whose
/// keyword appears in the prompt, falling back to a generic nudge.
pub fn respond(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    for (subject, response) in RESPONSES {
        if lowered.contains(subject.as_str()) {
            return response.to_string();
        }
    }
    format!(
        "Interesting topic \"{topic}\"! This is an important subject to study. I recommend \
         starting with basic concepts and gradually moving to more complex topics. Do you \
         have specific questions about this topic?"
    )
}
