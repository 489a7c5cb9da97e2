use dioxus::prelude::*;

use crate::views::Layout;

#[derive(Props, Clone, PartialEq)]
pub struct AlreadyCompletedPageProps {
    pub survey_title: String,
    #[props(default)]
    pub flashes: Vec<String>,
}

#[component]
pub fn AlreadyCompletedPage(props: AlreadyCompletedPageProps) -> Element {
    rsx! {
        Layout { page_title: "Already done".to_owned(), flashes: props.flashes.clone(),
            h1 { "Already done" }
            p { "You have already completed {props.survey_title}. Try again in a little while." }
            a { href: "/", "Back to surveys" }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct ErrorPageProps {
    pub status: u16,
    pub message: String,
}

#[component]
pub fn ErrorPage(props: ErrorPageProps) -> Element {
    rsx! {
        Layout { page_title: format!("Error {}", props.status), flashes: Vec::new(),
            h1 { "Error {props.status}" }
            p { class: "error", "{props.message}" }
            a { href: "/", "Back to surveys" }
        }
    }
}
