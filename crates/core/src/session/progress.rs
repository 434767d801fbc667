use super::quiz_session::SessionStatus;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub cursor: usize,
    pub status: SessionStatus,
}

impl SessionProgress {
    /// One-based position for "Question 2 of 5" style labels.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor + 1
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}
