use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use services::{Action, FlowStep, SurveyFlowService};
use survey_core::model::Choice;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{info, warn};
use ui::{map_flow_step, page_url, render_page};

use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    flow: Arc<SurveyFlowService>,
}

impl AppState {
    #[must_use]
    pub fn new(flow: Arc<SurveyFlowService>) -> Self {
        Self { flow }
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionForm {
    action: String,
    choice: Option<String>,
}

impl ActionForm {
    fn parse(&self) -> Result<Action, AppError> {
        match self.action.as_str() {
            "start" => Ok(Action::Start),
            "submit" => Ok(Action::Submit),
            "choose" => {
                let raw = self
                    .choice
                    .as_deref()
                    .ok_or_else(|| AppError::MalformedForm("choose needs a choice".into()))?;
                let choice: Choice = raw
                    .parse()
                    .map_err(|_| AppError::MalformedForm(format!("unknown choice `{raw}`")))?;
                Ok(Action::Choose(choice))
            }
            other => Err(AppError::MalformedForm(format!("unknown action `{other}`"))),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_page).post(post_action))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn show_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let step = state.flow.open(query.q.as_deref())?;
    Ok(respond(&step, StatusCode::OK))
}

async fn post_action(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Form(form): Form<ActionForm>,
) -> Result<Response, AppError> {
    let action = form.parse()?;
    let step = state.flow.apply(query.q.as_deref(), action).await?;
    let status = if step.notice.is_some() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    Ok(respond(&step, status))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Redirects to the step's address when it moved, otherwise renders it.
fn respond(step: &FlowStep, status: StatusCode) -> Response {
    let no_store = [(header::CACHE_CONTROL, "no-store")];
    if step.redirect {
        return (no_store, Redirect::to(&page_url(step.token.as_str()))).into_response();
    }
    (status, no_store, Html(render_page(map_flow_step(step)))).into_response()
}

/// Serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "survey server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("survey server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(err) => {
                warn!(error = %err, "could not listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use services::{StateCodec, SurveyServices};
    use storage::repository::InMemoryRepository;
    use survey_core::ImageResolver;
    use survey_core::model::{IdSource, MetadataPool, SessionState, Slot, UserId, Variant};
    use survey_core::time::fixed_clock;
    use tower::ServiceExt;

    fn codec() -> StateCodec {
        StateCodec::from_key_bytes(&[5_u8; 32]).unwrap()
    }

    fn app(pool: MetadataPool, repo: InMemoryRepository) -> Router {
        let services = SurveyServices::from_parts(
            codec(),
            ImageResolver::default(),
            Arc::new(pool),
            Arc::new(repo),
            1,
            fixed_clock(),
            IdSource::fixed(UserId::new("abc123").unwrap()),
        );
        router(AppState::new(services.flow()))
    }

    fn one_slot_pool() -> MetadataPool {
        MetadataPool::new(vec![Slot::new(vec![Variant::new("gt", "a", "b")])])
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post(uri: &str, form: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn first_visit_redirects_to_a_fresh_token() {
        let response = app(one_slot_pool(), InMemoryRepository::new())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/?q="));
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }

    #[tokio::test]
    async fn valid_token_renders_the_page() {
        let token = codec()
            .encode(&SessionState::intro(UserId::new("abc123").unwrap()))
            .unwrap();
        let response = app(one_slot_pool(), InMemoryRepository::new())
            .oneshot(
                Request::get(page_url(token.as_str()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("value=\"start\""), "missing start form in {html}");
    }

    #[tokio::test]
    async fn full_flow_over_http_appends_one_row() {
        let repo = InMemoryRepository::new();
        let router = app(one_slot_pool(), repo.clone());
        let intro = codec()
            .encode(&SessionState::intro(UserId::new("abc123").unwrap()))
            .unwrap();

        let mut address = page_url(intro.as_str());
        for form in ["action=start", "action=choose&choice=B", "action=submit"] {
            let response = router.clone().oneshot(post(&address, form)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "after {form}");
            address = location(&response);
        }

        let rows = repo.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "abc123");
        assert_eq!(rows[0][2], "B_0");

        let response = router
            .oneshot(Request::get(address).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("survey is complete"));
    }

    #[tokio::test]
    async fn malformed_forms_are_rejected() {
        let response = app(one_slot_pool(), InMemoryRepository::new())
            .oneshot(post("/", "action=dance"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_metadata_is_a_503_page() {
        let response = app(MetadataPool::empty(), InMemoryRepository::new())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_text(response).await.contains("Survey unavailable"));
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let response = app(MetadataPool::empty(), InMemoryRepository::new())
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }
}
