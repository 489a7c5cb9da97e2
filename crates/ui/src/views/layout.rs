use dioxus::prelude::*;

/// Page shell shared by every survey screen; renders pending flash messages above the content.
#[component]
pub fn Layout(page_title: String, flashes: Vec<String>, children: Element) -> Element {
    rsx! {
        html { lang: "en",
            head {
                meta { charset: "utf-8" }
                meta { name: "viewport", content: "width=device-width, initial-scale=1" }
                title { "{page_title}" }
            }
            body {
                if !flashes.is_empty() {
                    ul { class: "flashes",
                        for message in flashes.iter() {
                            li { class: "flash", "{message}" }
                        }
                    }
                }
                main { class: "page", {children} }
            }
        }
    }
}
