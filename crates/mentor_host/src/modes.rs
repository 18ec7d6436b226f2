//! Mode-specific task instructions.
//!
//! Each [`Mode`] carries two fixed texts: the instruction the model receives
//! as its focus area, and the framing sentence the client puts in front of
//! the user's own inputs.

use shared::Mode;

/// Instruction pair for one mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeInstructions {
    pub task_instruction: &'static str,
    pub framing_sentence: &'static str,
}

/// Get the instructions for a mode
pub fn resolve(mode: Mode) -> &'static ModeInstructions {
    match mode {
        Mode::Career => &CAREER_INSTRUCTIONS,
        Mode::Resume => &RESUME_INSTRUCTIONS,
        Mode::Study => &STUDY_INSTRUCTIONS,
        Mode::Interview => &INTERVIEW_INSTRUCTIONS,
    }
}

/// Same as [`resolve`] for a raw identifier; unknown values get the career roadmap.
pub fn resolve_str(raw: &str) -> &'static ModeInstructions {
    resolve(Mode::parse(raw))
}

static CAREER_INSTRUCTIONS: ModeInstructions = ModeInstructions {
    task_instruction: "Create a detailed 2-year career roadmap. Include: 3 potential career paths, core skills to master, recommended learning resources, networking strategies, and portfolio project ideas.",
    framing_sentence: "You want a full career roadmap to reach your long-term goal.",
};

static RESUME_INSTRUCTIONS: ModeInstructions = ModeInstructions {
    task_instruction: "Suggest resume enhancements: specific skills, certifications, and tools to add based on the user's goals. Include quantifiable achievements where possible.",
    framing_sentence: "You want tips to boost your resume with your current skills and goals.",
};

static STUDY_INSTRUCTIONS: ModeInstructions = ModeInstructions {
    task_instruction: "Build a 6-month personalized study plan. Break it down into monthly milestones with specific topics, recommended resources (free and paid), and practice exercises.",
    framing_sentence: "You want a 6-month personalized study plan to reach your goal.",
};

static INTERVIEW_INSTRUCTIONS: ModeInstructions = ModeInstructions {
    task_instruction: "Generate personalized interview prep guidance, including: 5 common technical questions, 3 behavioral questions, ideal answer structures, and company research tips for the user's target role.",
    framing_sentence: "You want interview preparation tailored to your field.",
};
