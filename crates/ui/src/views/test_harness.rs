use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{QuestionDraft, QuestionId, QuizId, QuizSet, TimeBudget};
use quiz_core::time::fixed_now;
use services::{AttemptHistoryService, Clock, QuizLoopService, SessionConfig};
use storage::repository::{AttemptRepository, QuizRepository, Storage};

use super::quiz::QuizTestHandles;
use crate::context::{UiApp, build_app_context};
use crate::views::{HistoryView, QuizView};
use crate::vm::{QuizIntent, QuizPhase, QuizVm};

#[derive(Clone)]
struct TestApp {
    quiz_id: QuizId,
    quiz_loop: Arc<QuizLoopService>,
    attempt_history: Arc<AttemptHistoryService>,
}

impl UiApp for TestApp {
    fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    fn attempt_history(&self) -> Arc<AttemptHistoryService> {
        Arc::clone(&self.attempt_history)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Quiz,
    History,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: Option<QuizTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.quiz_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Quiz => rsx! { QuizView {} },
        ViewKind::History => rsx! { HistoryView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub quiz_id: QuizId,
    pub quiz_handles: Option<QuizTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..4 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    /// Dispatch an intent as a click would, then let the spawned task finish.
    pub async fn dispatch(&mut self, intent: QuizIntent) {
        let handles = self.quiz_handles.clone().expect("quiz handles installed");
        self.dom.in_runtime(|| handles.dispatch().call(intent));
        self.drive_async().await;
    }

    pub fn vm_phase(&self) -> Option<QuizPhase> {
        let handles = self.quiz_handles.as_ref().expect("quiz handles installed");
        self.dom
            .in_runtime(|| handles.vm().read().as_ref().map(QuizVm::phase))
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn sample_quiz(quiz_id: QuizId) -> QuizSet {
    let questions = [
        ("Which keyword declares a constant?", vec!["let", "const", "static mut"]),
        ("Which trait enables `{}` formatting?", vec!["Debug", "Display"]),
        ("What does `?` do on an `Err`?", vec!["Panics", "Returns early", "Ignores it"]),
    ]
    .into_iter()
    .zip(1..)
    .map(|((prompt, options), id)| {
        QuestionDraft::new(prompt, options)
            .with_time_allotment(30)
            .validate(QuestionId::new(id))
            .expect("valid question")
    })
    .collect::<Vec<_>>();
    let budget = TimeBudget::from_allotments(&questions);
    QuizSet::new(quiz_id, "Rust Basics", questions, budget).expect("valid quiz")
}

pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = Storage::in_memory();
    let attempts = Arc::clone(&storage.attempts);
    setup_view_harness_with(view, storage, attempts, SessionConfig::default()).await
}

pub async fn setup_view_harness_with(
    view: ViewKind,
    storage: Storage,
    attempts: Arc<dyn AttemptRepository>,
    config: SessionConfig,
) -> ViewHarness {
    let quiz_id = QuizId::new(1);
    storage
        .quizzes
        .upsert_quiz(&sample_quiz(quiz_id))
        .await
        .expect("seed quiz");

    let clock = Clock::fixed(fixed_now());
    let quiz_loop = Arc::new(
        QuizLoopService::new(clock, Arc::clone(&storage.quizzes), Arc::clone(&attempts))
            .with_config(config),
    );
    let attempt_history = Arc::new(AttemptHistoryService::new(attempts));

    let quiz_handles = match view {
        ViewKind::Quiz => Some(QuizTestHandles::default()),
        ViewKind::History => None,
    };

    let app = Arc::new(TestApp {
        quiz_id,
        quiz_loop,
        attempt_history,
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        storage,
        quiz_id,
        quiz_handles,
    }
}

/// Harness over a caller-supplied quiz repository.
pub async fn setup_view_harness_with_quizzes(
    view: ViewKind,
    quizzes: Arc<dyn QuizRepository>,
) -> ViewHarness {
    let storage = Storage::in_memory();
    let clock = Clock::fixed(fixed_now());
    let quiz_loop = Arc::new(QuizLoopService::new(
        clock,
        quizzes,
        Arc::clone(&storage.attempts),
    ));
    let attempt_history = Arc::new(AttemptHistoryService::new(Arc::clone(&storage.attempts)));
    let quiz_handles = match view {
        ViewKind::Quiz => Some(QuizTestHandles::default()),
        ViewKind::History => None,
    };
    let app = Arc::new(TestApp {
        quiz_id: QuizId::new(1),
        quiz_loop,
        attempt_history,
    });
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );
    ViewHarness {
        dom,
        storage,
        quiz_id: QuizId::new(1),
        quiz_handles,
    }
}
