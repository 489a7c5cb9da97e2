use dioxus::prelude::*;

use crate::views::Layout;
use crate::vm::SurveyStartVm;

#[derive(Props, Clone, PartialEq)]
pub struct SurveyStartPageProps {
    pub vm: SurveyStartVm,
    #[props(default)]
    pub flashes: Vec<String>,
}

#[component]
pub fn SurveyStartPage(props: SurveyStartPageProps) -> Element {
    let vm = &props.vm;
    rsx! {
        Layout { page_title: vm.title.clone(), flashes: props.flashes.clone(),
            h1 { "{vm.title}" }
            div { class: "instructions", dangerous_inner_html: "{vm.instructions_html}" }
            p { class: "count", "{vm.question_count_str}" }
            form { method: "post", action: "/begin",
                button { r#type: "submit", "Start" }
            }
        }
    }
}
