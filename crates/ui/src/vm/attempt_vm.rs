use services::{AttemptId, AttemptListItem};

use crate::vm::time_fmt::{format_clock, format_datetime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptCardVm {
    pub id: AttemptId,
    pub submitted_at_str: String,
    pub duration_str: String,

    pub answered: u32,
    pub total: u32,
}

impl From<&AttemptListItem> for AttemptCardVm {
    fn from(item: &AttemptListItem) -> Self {
        Self {
            id: item.id,
            submitted_at_str: format_datetime(item.submitted_at),
            duration_str: format_clock(item.duration),
            answered: item.answered,
            total: item.total,
        }
    }
}

#[must_use]
pub fn map_attempt_cards(items: &[AttemptListItem]) -> Vec<AttemptCardVm> {
    items.iter().map(AttemptCardVm::from).collect()
}
