use dioxus::prelude::*;

use crate::views::Layout;
use crate::vm::SurveyCardVm;

#[derive(Props, Clone, PartialEq)]
pub struct SurveyPickerPageProps {
    pub surveys: Vec<SurveyCardVm>,
    #[props(default)]
    pub flashes: Vec<String>,
}

#[component]
pub fn SurveyPickerPage(props: SurveyPickerPageProps) -> Element {
    rsx! {
        Layout { page_title: "Pick a survey".to_owned(), flashes: props.flashes.clone(),
            h1 { "Pick a survey" }
            if props.surveys.is_empty() {
                p { class: "empty", "No surveys are available." }
            } else {
                form { method: "post", action: "/",
                    for (index, card) in props.surveys.iter().enumerate() {
                        SurveyOption { key: "{card.key}", card: card.clone(), checked: index == 0 }
                    }
                    button { r#type: "submit", "Go" }
                }
            }
        }
    }
}

#[component]
fn SurveyOption(card: SurveyCardVm, checked: bool) -> Element {
    rsx! {
        label { class: "survey-option",
            input {
                r#type: "radio",
                name: "survey_code",
                value: "{card.key}",
                checked: checked,
            }
            span { class: "title", "{card.title}" }
            span { class: "count", " ({card.question_count_str})" }
        }
    }
}
