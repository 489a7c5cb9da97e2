use dioxus::prelude::*;

use crate::views::Layout;
use crate::vm::{AnswerVm, CompletionVm};

#[derive(Props, Clone, PartialEq)]
pub struct CompletionPageProps {
    pub vm: CompletionVm,
    #[props(default)]
    pub flashes: Vec<String>,
}

#[component]
pub fn CompletionPage(props: CompletionPageProps) -> Element {
    let vm = &props.vm;
    rsx! {
        Layout { page_title: "Thank you!".to_owned(), flashes: props.flashes.clone(),
            h1 { "Thank you!" }
            p { "You finished {vm.survey_title}." }
            ol { class: "answers",
                for answer in vm.answers.iter() {
                    AnswerRow { answer: answer.clone() }
                }
            }
            a { href: "/", "Back to surveys" }
        }
    }
}

#[component]
fn AnswerRow(answer: AnswerVm) -> Element {
    rsx! {
        li {
            p { class: "question", "{answer.question}" }
            p { class: "choice", "{answer.choice}" }
            if let Some(text) = answer.text.as_ref() {
                blockquote { class: "comment", "{text}" }
            }
        }
    }
}
