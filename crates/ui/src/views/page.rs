use dioxus::prelude::*;

use super::intro::IntroView;
use super::question::QuestionView;
use super::terminal::TerminalView;
use crate::vm::{PageBody, PageVm};

#[derive(Props, Clone, PartialEq)]
pub struct PageProps {
    pub vm: PageVm,
}

/// Root component for every survey page.
#[component]
pub fn Page(props: PageProps) -> Element {
    let PageVm {
        action_url,
        progress_label,
        progress_percent,
        body,
        ..
    } = props.vm;
    let action_url = action_url.unwrap_or_default();

    rsx! {
        div { class: "page",
            match progress_label {
                Some(label) => rsx! {
                    h3 { class: "progress-label", "{label}" }
                    div { class: "progress",
                        div { class: "progress-fill", style: "width: {progress_percent}%" }
                    }
                },
                None => rsx! {},
            }

            match body {
                PageBody::Intro { total_questions } => rsx! {
                    IntroView { total_questions, action_url }
                },
                PageBody::Question { option_a, ground_truth, option_b } => rsx! {
                    QuestionView { option_a, ground_truth, option_b, action_url }
                },
                PageBody::Terminal { submitted, notice } => rsx! {
                    TerminalView { submitted, notice, action_url }
                },
                PageBody::Unavailable { message } => rsx! {
                    div { class: "notice error",
                        h3 { "Survey unavailable" }
                        p { "{message}" }
                    }
                },
            }
        }
    }
}
