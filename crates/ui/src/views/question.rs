use dioxus::prelude::*;

use crate::vm::ImageVm;

#[component]
pub fn QuestionView(
    option_a: ImageVm,
    ground_truth: ImageVm,
    option_b: ImageVm,
    action_url: String,
) -> Element {
    let action_a = action_url.clone();
    rsx! {
        div { class: "columns",
            div { class: "column",
                ImageColumn { image: option_a }
                ChoiceForm { action_url: action_a, choice: "A" }
            }
            div { class: "column",
                ImageColumn { image: ground_truth }
            }
            div { class: "column",
                ImageColumn { image: option_b }
                ChoiceForm { action_url, choice: "B" }
            }
        }
    }
}

#[component]
fn ImageColumn(image: ImageVm) -> Element {
    let ImageVm {
        caption,
        url,
        highlight,
    } = image;
    let caption_class = if highlight {
        "img-caption highlight"
    } else {
        "img-caption"
    };

    rsx! {
        div { class: "{caption_class}", "{caption}" }
        match url {
            Some(src) => rsx! {
                img { src: "{src}", alt: "{caption}" }
            },
            None => rsx! {
                div { class: "img-missing", "No image" }
            },
        }
    }
}

#[component]
fn ChoiceForm(action_url: String, choice: &'static str) -> Element {
    rsx! {
        form { method: "post", action: "{action_url}",
            input { r#type: "hidden", name: "action", value: "choose" }
            input { r#type: "hidden", name: "choice", value: "{choice}" }
            button { r#type: "submit", class: "choice", "Select {choice}" }
        }
    }
}
