use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Quiz" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| fatal_screen(errors),
                Router::<Route> {}
            }
        }
    }
}

/// Last-resort screen for render errors that escaped a view. Offers a reset
/// back into the router; an in-flight attempt is lost at this point.
fn fatal_screen(errors: ErrorContext) -> Element {
    let details = format!("{errors:?}");
    rsx! {
        div { class: "fatal",
            h1 { "Something went wrong" }
            p { "The quiz screen stopped responding. Your submitted attempts are kept." }
            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| errors.clear_errors(),
                "Reload"
            }
            details {
                summary { "Details" }
                pre { "{details}" }
            }
        }
    }
}
