use dioxus::prelude::*;

use quiz_core::model::{Question, Selection};

/// Renders one question and its options. Holds no state of its own; picks
/// are reported through `on_select` with the zero-based option index.
#[component]
pub fn QuestionView(
    question: Question,
    selected: Selection,
    on_select: EventHandler<usize>,
    #[props(default)] disabled: bool,
) -> Element {
    let chosen = selected.index();

    rsx! {
        section { class: "question", aria_labelledby: "question-prompt",
            p { class: "question-prompt", id: "question-prompt", "{question.prompt()}" }
            ul { class: "question-options", role: "radiogroup",
                for (index, label) in question.options().iter().enumerate() {
                    li { key: "{index}",
                        button {
                            class: if chosen == Some(index) { "question-option question-option--selected" } else { "question-option" },
                            id: "question-option-{index}",
                            r#type: "button",
                            role: "radio",
                            aria_checked: if chosen == Some(index) { "true" } else { "false" },
                            disabled,
                            onclick: move |_| on_select.call(index),
                            span { class: "question-option__key", "{index + 1}" }
                            span { class: "question-option__label", "{label}" }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, QuestionId};

    #[derive(Props, Clone, PartialEq)]
    struct HarnessProps {
        question: Question,
        selected: Selection,
    }

    fn Harness(props: HarnessProps) -> Element {
        rsx! {
            QuestionView {
                question: props.question,
                selected: props.selected,
                on_select: move |_| {},
            }
        }
    }

    fn render(selected: Selection) -> String {
        let question = QuestionDraft::new("Pick a colour", ["Red", "Green", "Blue"])
            .validate(QuestionId::new(1))
            .unwrap();
        let mut dom = VirtualDom::new_with_props(Harness, HarnessProps { question, selected });
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    #[test]
    fn renders_prompt_and_options_in_order() {
        let html = render(Selection::Unanswered);
        assert!(html.contains("Pick a colour"), "missing prompt in {html}");
        let red = html.find("Red").unwrap();
        let green = html.find("Green").unwrap();
        let blue = html.find("Blue").unwrap();
        assert!(red < green && green < blue, "options out of order in {html}");
        assert!(!html.contains("question-option--selected"), "{html}");
    }

    #[test]
    fn highlights_selected_option() {
        let html = render(Selection::Chosen(1));
        assert_eq!(html.matches("question-option--selected").count(), 1, "{html}");
        assert_eq!(html.matches("aria-checked=\"true\"").count(), 1, "{html}");
        let selected = html.find("question-option--selected").unwrap();
        let green = html.find("Green").unwrap();
        let blue = html.find("Blue").unwrap();
        assert!(selected < green && green < blue, "{html}");
    }
}
