use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AttemptCardVm, map_attempt_cards};

const RECENT_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
struct HistoryData {
    cards: Vec<AttemptCardVm>,
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.attempt_history();
    let quiz_id = ctx.quiz_id();

    let resource = use_resource(move || {
        let history = history.clone();
        async move {
            let items = history
                .list_recent(quiz_id, RECENT_LIMIT)
                .await
                .map_err(|_| ViewError::Unknown)?;
            let cards = map_attempt_cards(&items);
            Ok(HistoryData { cards })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "History" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        p { "No attempts yet." }
                    } else {
                        ul { class: "attempt-list",
                            for card in data.cards {
                                AttemptCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn AttemptCard(card: AttemptCardVm) -> Element {
    rsx! {
        li { class: "attempt-card",
            span { class: "attempt-date", "{card.submitted_at_str}" }
            p {
                "Answered: {card.answered} / {card.total} | Time: {card.duration_str}"
            }
        }
    }
}
