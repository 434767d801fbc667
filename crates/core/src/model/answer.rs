use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// The learner's pick for one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Unanswered,
    Chosen(usize),
}

impl Selection {
    /// Selected option index, if any.
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::Unanswered => None,
            Selection::Chosen(index) => Some(index),
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, Selection::Chosen(_))
    }
}

/// Question id to selection, kept in question order.
///
/// Every question of the attempt has an entry from the start; unanswered
/// questions stay `Selection::Unanswered` rather than being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerState {
    entries: Vec<(QuestionId, Selection)>,
}

impl AnswerState {
    /// An all-unanswered state for the given questions.
    #[must_use]
    pub fn for_questions(questions: &[Question]) -> Self {
        Self {
            entries: questions
                .iter()
                .map(|q| (q.id(), Selection::Unanswered))
                .collect(),
        }
    }

    /// Rebuild from stored pairs, e.g. a persisted attempt.
    #[must_use]
    pub fn from_entries(entries: Vec<(QuestionId, Selection)>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<Selection> {
        self.entries
            .iter()
            .find(|(id, _)| *id == question_id)
            .map(|(_, selection)| *selection)
    }

    pub(crate) fn set(&mut self, question_id: QuestionId, selection: Selection) -> bool {
        match self.entries.iter_mut().find(|(id, _)| *id == question_id) {
            Some((_, slot)) => {
                *slot = selection;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, Selection)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.entries.iter().filter(|(_, s)| s.is_answered()).count()
    }

    /// True when every question has a chosen option.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered_count() == self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;

    fn questions() -> Vec<Question> {
        (1..=3)
            .map(|id| {
                QuestionDraft::new(format!("Q{id}"), ["A", "B"])
                    .validate(QuestionId::new(id))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn starts_with_every_question_unanswered() {
        let state = AnswerState::for_questions(&questions());
        assert_eq!(state.len(), 3);
        assert_eq!(state.answered_count(), 0);
        assert_eq!(state.get(QuestionId::new(2)), Some(Selection::Unanswered));
        assert_eq!(state.get(QuestionId::new(9)), None);
    }

    #[test]
    fn set_overwrites_and_ignores_unknown_ids() {
        let mut state = AnswerState::for_questions(&questions());
        assert!(state.set(QuestionId::new(1), Selection::Chosen(0)));
        assert!(state.set(QuestionId::new(1), Selection::Chosen(1)));
        assert!(!state.set(QuestionId::new(9), Selection::Chosen(0)));
        assert_eq!(state.get(QuestionId::new(1)), Some(Selection::Chosen(1)));
        assert_eq!(state.answered_count(), 1);
        assert!(!state.is_complete());
    }

    #[test]
    fn iteration_follows_question_order() {
        let state = AnswerState::for_questions(&questions());
        let ids: Vec<u64> = state.iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
