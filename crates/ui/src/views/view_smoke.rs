use services::Token;
use services::flow::{ComparisonImages, FlowStep, Notice, Screen};
use survey_core::model::{Choice, SessionState, UserId};

use crate::render::render_page;
use crate::vm::{map_flow_step, unavailable_page};

fn uid() -> UserId {
    UserId::new("abc123").unwrap()
}

fn render(state: SessionState, screen: Screen, notice: Option<Notice>) -> String {
    render_page(map_flow_step(&FlowStep {
        state,
        token: Token::from_raw("tok123"),
        screen,
        redirect: false,
        notice,
    }))
}

#[test]
fn intro_view_smoke_renders_start_form() {
    let html = render(
        SessionState::intro(uid()),
        Screen::Intro { total_questions: 37 },
        None,
    );
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Sample 0 / 37"), "missing progress in {html}");
    assert!(html.contains("37 samples"), "missing count in {html}");
    assert!(html.contains("action=\"/?q=tok123\""), "missing form target in {html}");
    assert!(html.contains("value=\"start\""), "missing start action in {html}");
    assert!(html.contains("popstate"), "missing reload script in {html}");
}

#[test]
fn question_view_smoke_renders_three_columns() {
    let state = SessionState::intro(uid()).started();
    let html = render(
        state,
        Screen::Question {
            index: 0,
            total_questions: 37,
            images: ComparisonImages {
                ground_truth: Some("https://img.example/gt".into()),
                option_a: Some("https://img.example/a".into()),
                option_b: None,
            },
        },
        None,
    );
    assert!(html.contains("Sample 1 / 37"), "missing progress in {html}");
    assert!(html.contains("src=\"https://img.example/gt\""), "missing gt in {html}");
    assert!(html.contains("src=\"https://img.example/a\""), "missing a in {html}");
    assert!(html.contains("No image"), "missing placeholder in {html}");
    assert!(html.contains("Select A"), "missing A button in {html}");
    assert!(html.contains("Select B"), "missing B button in {html}");
    assert!(html.contains("value=\"choose\""), "missing choose action in {html}");
}

#[test]
fn terminal_view_smoke_renders_submit_and_notice() {
    let state = SessionState::intro(uid()).started().answered(Choice::A);
    let html = render(
        state,
        Screen::Terminal {
            total_questions: 1,
            submitted: false,
        },
        Some(Notice::SubmissionFailed("sink offline".into())),
    );
    assert!(html.contains("value=\"submit\""), "missing submit action in {html}");
    assert!(html.contains("sink offline"), "missing failure notice in {html}");
}

#[test]
fn submitted_view_smoke_hides_the_form() {
    let state = SessionState::intro(uid())
        .started()
        .answered(Choice::B)
        .mark_submitted();
    let html = render(
        state,
        Screen::Terminal {
            total_questions: 1,
            submitted: true,
        },
        None,
    );
    assert!(html.contains("survey is complete"), "missing completion in {html}");
    assert!(!html.contains("<form"), "unexpected form in {html}");
}

#[test]
fn unavailable_view_smoke_renders_message() {
    let html = render_page(unavailable_page());
    assert!(html.contains("Survey unavailable"), "missing heading in {html}");
    assert!(!html.contains("Sample"), "unexpected progress in {html}");
}
