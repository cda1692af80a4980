use dioxus::prelude::*;

#[component]
pub fn TerminalView(submitted: bool, notice: Option<String>, action_url: String) -> Element {
    if submitted {
        return rsx! {
            div { class: "notice success",
                "The survey is complete. You may close this window."
            }
        };
    }

    rsx! {
        div { class: "terminal",
            h3 { "Survey finished" }
            p { "You have answered every sample." }
            match notice {
                Some(text) => rsx! {
                    div { class: "notice error", "{text}" }
                },
                None => rsx! {},
            }
            form { method: "post", action: "{action_url}",
                input { r#type: "hidden", name: "action", value: "submit" }
                button { r#type: "submit", class: "primary", "Submit" }
            }
        }
    }
}
