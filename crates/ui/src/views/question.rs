use dioxus::prelude::*;

use crate::views::Layout;
use crate::vm::QuestionVm;

#[derive(Props, Clone, PartialEq)]
pub struct QuestionPageProps {
    pub vm: QuestionVm,
    #[props(default)]
    pub flashes: Vec<String>,
}

#[component]
pub fn QuestionPage(props: QuestionPageProps) -> Element {
    let vm = &props.vm;
    rsx! {
        Layout { page_title: vm.survey_title.clone(), flashes: props.flashes.clone(),
            p { class: "position", "{vm.position_str}" }
            h1 { "{vm.text}" }
            form { method: "post", action: "/answer",
                for choice in vm.choices.iter() {
                    label { key: "{choice}", class: "choice",
                        input { r#type: "radio", name: "answer", value: "{choice}", required: true }
                        " {choice}"
                    }
                }
                // Free text is only collected where the question asks for it.
                if vm.allow_text {
                    textarea { name: "text", rows: "3", placeholder: "Anything to add?" }
                }
                button { r#type: "submit", "Continue" }
            }
        }
    }
}
