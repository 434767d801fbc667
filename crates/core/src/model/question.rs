use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least one option")]
    NoOptions,

    #[error("option {index} has an empty label")]
    EmptyOption { index: usize },

    #[error("per-question time allotment must be > 0 seconds")]
    InvalidTimeAllotment,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One quiz item: a prompt and an ordered list of selectable option labels.
///
/// Correct-answer keys never reach the client, so a `Question` carries none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    time_allotment_secs: Option<u32>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Returns the label at `index`, if any.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn time_allotment_secs(&self) -> Option<u32> {
        self.time_allotment_secs
    }
}

/// Unvalidated question input as it arrives from a content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<String>,
    pub time_allotment_secs: Option<u32>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new<I, S>(prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            time_allotment_secs: None,
        }
    }

    #[must_use]
    pub fn with_time_allotment(mut self, secs: u32) -> Self {
        self.time_allotment_secs = Some(secs);
        self
    }

    /// Validate the draft into an immutable `Question`.
    ///
    /// Prompt and option labels are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is blank, there are no options,
    /// any option label is blank, or the time allotment is zero.
    pub fn validate(self, id: QuestionId) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let mut options = Vec::with_capacity(self.options.len());
        for (index, raw) in self.options.into_iter().enumerate() {
            let label = raw.trim();
            if label.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            options.push(label.to_string());
        }

        if self.time_allotment_secs == Some(0) {
            return Err(QuestionError::InvalidTimeAllotment);
        }

        Ok(Question {
            id,
            prompt,
            options,
            time_allotment_secs: self.time_allotment_secs,
        })
    }
}
