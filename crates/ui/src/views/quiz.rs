use std::time::Duration;

use dioxus::prelude::*;

use quiz_core::model::{Question, Selection};

use crate::context::AppContext;
use crate::views::{QuestionView, ViewError, ViewState, view_state_from_resource};
use crate::vm::{PaletteItemVm, QuizIntent, QuizPhase, QuizVm, start_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastAction {
    Load,
    Intent(QuizIntent),
}

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let quiz_loop = ctx.quiz_loop();
    let quiz_id = ctx.quiz_id();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<QuizVm>);
    let last_action = use_signal(|| None::<LastAction>);
    let mut tick = use_signal(|| 0_u64);

    // Display-only countdown; the session never enforces the budget.
    use_future(move || async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tick += 1;
        }
    });

    let quiz_loop_for_resource = quiz_loop.clone();
    let resource = use_resource(move || {
        let quiz_loop = quiz_loop_for_resource.clone();
        let mut error = error;
        let mut vm = vm;
        let mut last_action = last_action;

        async move {
            last_action.set(Some(LastAction::Load));
            vm.set(None);
            let started = start_quiz(&quiz_loop, quiz_id).await?;
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let quiz_loop = quiz_loop.clone();
        use_callback(move |intent: QuizIntent| {
            let quiz_loop = quiz_loop.clone();
            let mut error = error;
            let mut vm = vm;
            let mut last_action = last_action;

            spawn(async move {
                last_action.set(Some(LastAction::Intent(intent)));
                let taken = vm.write().take();
                let Some(mut vm_value) = taken else {
                    error.set(Some(ViewError::Unknown));
                    return;
                };

                let result = vm_value.apply(&quiz_loop, intent).await;

                // Put the session back even on errors; it is still the source of truth.
                vm.set(Some(vm_value));

                match result {
                    Ok(_) => error.set(None),
                    Err(err) => error.set(Some(err)),
                }
            });
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let on_restart = {
        let mut resource = resource;
        let mut error = error;
        use_callback(move |()| {
            error.set(None);
            resource.restart();
        })
    };
    let retry_action = use_callback(move |()| match last_action() {
        Some(LastAction::Load) | None => on_restart.call(()),
        Some(LastAction::Intent(intent)) => dispatch_intent.call(intent),
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        let answering = vm
            .read()
            .as_ref()
            .is_some_and(|vm| vm.phase() == QuizPhase::Answering);
        if !answering {
            return;
        }
        match evt.data.key() {
            Key::ArrowRight => {
                evt.prevent_default();
                dispatch_intent.call(QuizIntent::Next);
            }
            Key::ArrowLeft => {
                evt.prevent_default();
                dispatch_intent.call(QuizIntent::Back);
            }
            Key::Character(value) => {
                if let Ok(digit @ 1..=9) = value.parse::<usize>() {
                    evt.prevent_default();
                    dispatch_intent.call(QuizIntent::Select(digit - 1));
                }
            }
            _ => {}
        }
    });

    let _ = tick();
    let now = quiz_loop.now();
    let vm_guard = vm.read();
    let current_error = *error.read();

    let body = match (state, vm_guard.as_ref()) {
        (ViewState::Idle, _) => rsx! {
            p { "Idle" }
        },
        (ViewState::Loading, _) | (ViewState::Ready(()), None) => rsx! {
            p { "Loading..." }
        },
        (ViewState::Error(err), _) => rsx! {
            p { class: "quiz-error", "{err.message()}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| retry_action.call(()),
                "Retry"
            }
        },
        (ViewState::Ready(()), Some(vm)) => rsx! {
            if let Some(err) = current_error {
                div { class: "quiz-error",
                    p { "{err.message()}" }
                    if err == ViewError::Unknown {
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| retry_action.call(()),
                            "Retry"
                        }
                    }
                }
            }
            match vm.phase() {
                QuizPhase::Answering => rsx! {
                    QuizBody { snapshot: AnsweringSnapshot::from_vm(vm), on_intent: dispatch_intent }
                },
                QuizPhase::Submitted => rsx! {
                    div { class: "quiz-complete",
                        h3 { class: "quiz-complete__title", "Quiz submitted" }
                        p { class: "quiz-complete__subtitle", "{vm.answered_label()}" }
                        if let Some(reason) = vm.submission_failure() {
                            p { class: "quiz-complete__failure", "Delivery failed: {reason}" }
                            if vm.can_retry_submission() {
                                button {
                                    class: "btn btn-primary",
                                    id: "quiz-retry-submit",
                                    r#type: "button",
                                    onclick: move |_| dispatch_intent.call(QuizIntent::RetrySubmission),
                                    "Retry submission"
                                }
                            }
                        }
                        button {
                            class: "btn btn-secondary",
                            id: "quiz-restart",
                            r#type: "button",
                            onclick: move |_| on_restart.call(()),
                            "Take again"
                        }
                    }
                },
                QuizPhase::Cancelled => rsx! {
                    div { class: "quiz-complete",
                        h3 { class: "quiz-complete__title", "Quiz cancelled" }
                        p { class: "quiz-complete__subtitle", "Your answers were discarded." }
                        button {
                            class: "btn btn-secondary",
                            id: "quiz-restart",
                            r#type: "button",
                            onclick: move |_| on_restart.call(()),
                            "Start again"
                        }
                    }
                },
            }
        },
    };
    let timer_label = vm_guard.as_ref().map(|vm| {
        vm.remaining_label(now).map_or_else(
            || format!("Elapsed: {}", vm.elapsed_label(now)),
            |remaining| format!("Time left: {remaining}"),
        )
    });

    rsx! {
        div { class: "page quiz-page", id: "quiz-root", tabindex: "0", onkeydown: on_key,
            header { class: "quiz-header",
                h2 { class: "quiz-title", "Quiz" }
                if let Some(label) = timer_label {
                    span { class: "quiz-timer", id: "quiz-timer", "{label}" }
                }
            }
            {body}
        }
    }
}

/// Everything the answering screen renders, detached from the signal guard.
#[derive(Clone, Debug, PartialEq)]
struct AnsweringSnapshot {
    question: Question,
    selected: Selection,
    progress_label: String,
    answered_label: String,
    next_label: &'static str,
    unanswered_notice: Option<String>,
    can_go_back: bool,
    can_advance: bool,
    shows_submit_button: bool,
    palette: Vec<PaletteItemVm>,
}

impl AnsweringSnapshot {
    fn from_vm(vm: &QuizVm) -> Self {
        Self {
            question: vm.question().clone(),
            selected: vm.selection(),
            progress_label: vm.progress_label(),
            answered_label: vm.answered_label(),
            next_label: vm.next_label(),
            unanswered_notice: vm.unanswered_notice(),
            can_go_back: vm.can_go_back(),
            can_advance: vm.can_advance(),
            shows_submit_button: vm.shows_submit_button(),
            palette: vm.palette(),
        }
    }
}

#[component]
fn QuizBody(snapshot: AnsweringSnapshot, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        div { class: "quiz-progress",
            span { class: "quiz-progress__position", "{snapshot.progress_label}" }
            span { class: "quiz-progress__answered", "{snapshot.answered_label}" }
        }
        nav { class: "quiz-palette", aria_label: "Questions",
            for item in snapshot.palette {
                button {
                    key: "{item.index}",
                    class: match (item.current, item.answered) {
                        (true, _) => "quiz-palette__item quiz-palette__item--current",
                        (false, true) => "quiz-palette__item quiz-palette__item--answered",
                        (false, false) => "quiz-palette__item",
                    },
                    r#type: "button",
                    onclick: move |_| on_intent.call(QuizIntent::Jump(item.index)),
                    "{item.label}"
                }
            }
        }
        QuestionView {
            question: snapshot.question,
            selected: snapshot.selected,
            on_select: move |index| on_intent.call(QuizIntent::Select(index)),
        }
        if let Some(notice) = snapshot.unanswered_notice {
            p { class: "quiz-notice", id: "quiz-unanswered", "{notice}" }
        }
        div { class: "quiz-nav",
            button {
                class: "btn btn-secondary",
                id: "quiz-back",
                r#type: "button",
                disabled: !snapshot.can_go_back,
                onclick: move |_| on_intent.call(QuizIntent::Back),
                "Back"
            }
            button {
                class: "btn btn-primary",
                id: "quiz-next",
                r#type: "button",
                disabled: !snapshot.can_advance,
                onclick: move |_| on_intent.call(QuizIntent::Next),
                "{snapshot.next_label}"
            }
            if snapshot.shows_submit_button {
                button {
                    class: "btn btn-primary",
                    id: "quiz-submit",
                    r#type: "button",
                    onclick: move |_| on_intent.call(QuizIntent::Submit),
                    "Submit"
                }
            }
            button {
                class: "btn btn-ghost",
                id: "quiz-cancel",
                r#type: "button",
                onclick: move |_| on_intent.call(QuizIntent::Cancel),
                "Cancel"
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizVm>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>, vm: Signal<Option<QuizVm>>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }
}
