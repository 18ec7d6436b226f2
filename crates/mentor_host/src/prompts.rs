//! System prompt construction for the career mentor.

use shared::agent_api::Turn;

/// Build the system prompt for a resolved task instruction.
///
/// `mode_label` is echoed verbatim so the upstream transcript shows which
/// mode the client asked for.
pub fn system_prompt(task_instruction: &str, mode_label: &str) -> String {
    format!(
        r#"You are an expert career mentor AI with 10+ years experience in tech recruiting.
Guidance must be:
- Specific to the user's current skills and goals
- Actionable with clear next steps
- Formatted in Markdown with ## headings and bullet points
- Include resources (links when possible)
- Address potential roadblocks

Current Mode: {mode_label}
Focus Area: {task_instruction}
"#,
        mode_label = mode_label,
        task_instruction = task_instruction,
    )
}

/// Prepend the system prompt to the conversation.
///
/// The result always starts with exactly one system message; the turns
/// follow unchanged and in their original order.
pub fn assemble(turns: &[Turn], task_instruction: &str, mode_label: &str) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(Turn::system(system_prompt(task_instruction, mode_label)));
    messages.extend_from_slice(turns);
    messages
}

/// Fixed single-shot prompt for the legacy skills/interests/goals form.
pub fn legacy_messages(skills: &str, interests: &str, goals: &str) -> Vec<Turn> {
    vec![
        Turn::system(
            "You are an expert career mentor AI with 10+ years experience in tech recruiting. \
             Give specific, actionable guidance formatted in Markdown with ## headings and bullet points.",
        ),
        Turn::user(format!(
            r#"Create a personalized career roadmap for someone with the following profile:

Skills: {skills}
Interests: {interests}
Goals: {goals}

Include skills to learn next, recommended resources, project ideas, and a realistic timeline."#,
        )),
    ]
}
