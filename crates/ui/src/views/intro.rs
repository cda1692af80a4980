use dioxus::prelude::*;

#[component]
pub fn IntroView(total_questions: usize, action_url: String) -> Element {
    rsx! {
        div { class: "intro-box",
            h1 { "Edge Quality Survey" }
            hr {}
            p {
                "This survey measures how similar distorted edges look to a reference edge. "
                "It has "
                strong { "{total_questions} samples" }
                ". For each one, pick the option that looks closer to the ground truth in the middle."
            }
            ul {
                li { "Takes about five minutes." }
                li { "Answers are anonymous and used for research only." }
                li { "Keep this address: it holds your progress." }
            }
            form { method: "post", action: "{action_url}",
                input { r#type: "hidden", name: "action", value: "start" }
                button { r#type: "submit", class: "primary", "Start" }
            }
        }
    }
}
