//! Guidance modes offered by the mentor.

use serde::{Deserialize, Serialize};

/// Which kind of guidance the user asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Multi-path two year roadmap
    #[default]
    Career,
    /// Resume skill boost
    Resume,
    /// Six month study plan
    Study,
    /// Interview preparation
    Interview,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Career, Mode::Resume, Mode::Study, Mode::Interview];

    /// Parse a mode identifier. Matching is exact; anything else,
    /// including a differently cased identifier, is `Career`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "resume" => Mode::Resume,
            "study" => Mode::Study,
            "interview" => Mode::Interview,
            _ => Mode::Career,
        }
    }

    /// Wire identifier, as sent in the `mode` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Career => "career",
            Mode::Resume => "resume",
            Mode::Study => "study",
            Mode::Interview => "interview",
        }
    }

    /// Human-readable name for the mode selector
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Career => "Full Career Roadmap",
            Mode::Resume => "Resume Skill Boost",
            Mode::Study => "Study Plan (6 months)",
            Mode::Interview => "Interview Prep Guidance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        for mode in Mode::ALL {
            assert_eq!(Mode::parse(mode.as_str()), mode);
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Mode::parse("Interview"), Mode::Career);
        assert_eq!(Mode::parse("RESUME"), Mode::Career);
        assert_eq!(Mode::parse(" study "), Mode::Career);
    }

    #[test]
    fn test_parse_falls_back_to_career() {
        assert_eq!(Mode::parse(""), Mode::Career);
        assert_eq!(Mode::parse("roadmap"), Mode::Career);
        assert_eq!(Mode::parse("undefined"), Mode::Career);
    }
}
