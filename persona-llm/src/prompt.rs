//! Self-assessment prompt.

use persona_core::Question;

/// Appended to the specification when the generator is interviewed.
pub const SELF_ASSESSMENT_INSTRUCTIONS: &str = "Stay fully in character. Rate how well each statement describes you \
on a scale from 1 (strongly disagree) to 5 (strongly agree). Reply with a single JSON object mapping \
each statement id to an integer, for example {\"A1\": 4, \"A2\": 2}. Do not add commentary.";

/// User message listing every statement as `ID: prompt`.
pub fn build_self_assessment_prompt(questions: &[Question]) -> String {
    let mut prompt = String::from(SELF_ASSESSMENT_INSTRUCTIONS);
    prompt.push_str("\n\n");
    for question in questions {
        prompt.push_str(&format!("{}: {}\n", question.id, question.prompt));
    }
    prompt
}
