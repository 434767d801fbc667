/// Behavior switches for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    merge_next_and_submit: bool,
    allow_resubmit_on_failure: bool,
}

impl SessionConfig {
    /// "Next" on the last question submits; failed submissions stay failed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            merge_next_and_submit: true,
            allow_resubmit_on_failure: false,
        }
    }

    /// When false, `next()` on the last question is rejected and only an
    /// explicit `submit()` finishes the attempt.
    #[must_use]
    pub fn with_merge_next_and_submit(mut self, merge: bool) -> Self {
        self.merge_next_and_submit = merge;
        self
    }

    /// Permit re-emitting the frozen answers after the sink reported failure.
    #[must_use]
    pub fn with_allow_resubmit_on_failure(mut self, allow: bool) -> Self {
        self.allow_resubmit_on_failure = allow;
        self
    }

    #[must_use]
    pub fn merge_next_and_submit(&self) -> bool {
        self.merge_next_and_submit
    }

    #[must_use]
    pub fn allow_resubmit_on_failure(&self) -> bool {
        self.allow_resubmit_on_failure
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
