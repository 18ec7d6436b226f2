//! Client-side conversation history.
//!
//! The store is an append-only value: appending returns a new store and
//! leaves the original untouched, so a request payload built from one
//! snapshot can never observe a later append.

use shared::agent_api::Turn;
use shared::Mode;
use std::sync::Arc;

use crate::modes;

/// Free-text inputs collected by the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub skills: String,
    pub interests: String,
    pub goals: String,
}

impl ProfileForm {
    /// All three fields are required before a submission.
    pub fn is_complete(&self) -> bool {
        [&self.skills, &self.interests, &self.goals]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.skills.clear();
        self.interests.clear();
        self.goals.clear();
    }
}

/// Text of the user turn for a submission: the mode's framing sentence
/// followed by the form inputs.
pub fn compose_user_turn(mode: Mode, form: &ProfileForm) -> String {
    format!(
        "{}\n\nSkills: {}\nInterests: {}\nGoals: {}",
        modes::resolve(mode).framing_sentence,
        form.skills,
        form.interests,
        form.goals
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStore {
    turns: Arc<[Turn]>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            turns: Arc::from(Vec::new()),
        }
    }

    pub fn append_user(&self, content: impl Into<String>) -> Self {
        self.append(Turn::user(content))
    }

    pub fn append_assistant(&self, content: impl Into<String>) -> Self {
        self.append(Turn::assistant(content))
    }

    fn append(&self, turn: Turn) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend_from_slice(&self.turns);
        turns.push(turn);
        Self {
            turns: turns.into(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
