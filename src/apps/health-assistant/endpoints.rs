// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::profile::{Session, SessionHandle};
use super::shell::{resolve_metric, Event};
use super::types::*;
use super::view::render_page;
use crate::common::{expired_session_cookie, ping, session_cookie, session_id_from_headers};
use crate::{AppError, AppState};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// `Set-Cookie` for sessions the store holds; nothing for throwaway ones.
fn cookie_for(handle: &SessionHandle) -> HeaderMap {
    if handle.is_known() {
        session_cookie(handle.id())
    } else {
        HeaderMap::new()
    }
}

/// Run one event for the caller's session and answer with the re-rendered page.
/// `None` just re-renders the current panel.
///
/// The session stays locked for the whole step, AI call included, so events of
/// one browser apply in order. A fresh session is only kept once it changes.
async fn apply(state: &AppState, headers: &HeaderMap, event: Option<Event>) -> Response {
    let mut handle = state.sessions.open(session_id_from_headers(headers)).await;
    let mut session = handle.lock().await;
    let event = event.unwrap_or(Event::SelectPanel(session.panel));
    let (next, view) = state.shell.handle(session.clone(), event).await;
    let changed = next != *session;
    *session = next;
    drop(session);

    if changed {
        state.sessions.keep(&mut handle).await;
    }
    (cookie_for(&handle), Html(render_page(&view))).into_response()
}

/// GET /: the page. `?panel=` switches panels, `?metric=` picks the analytics metric.
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let event = match (query.metric, query.panel) {
        (Some(metric), None | Some(Panel::HealthAnalytics)) => Some(Event::SelectMetric(metric)),
        (_, Some(panel)) => Some(Event::SelectPanel(panel)),
        (None, None) => None,
    };
    apply(&state, &headers, event).await
}

/// POST /profile: save the profile form.
pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    let event = match PatientProfile::try_from(form) {
        Ok(profile) => Event::SaveProfile(profile),
        Err(e) => Event::RejectProfile(e.user_message()),
    };
    apply(&state, &headers, Some(event)).await
}

/// POST /ask: a panel's action button.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<TaskForm>,
) -> Response {
    let event = match form.panel.parse::<Panel>() {
        Ok(panel) => Event::Submit {
            panel,
            input: form.input,
            metric: form.metric,
        },
        Err(e) => Event::RejectAction(e.user_message()),
    };
    apply(&state, &headers, Some(event)).await
}

/// POST /session/end: forget the session and start over.
pub async fn end_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers) {
        state.sessions.end(id).await;
    }
    (expired_session_cookie(), Redirect::to("/")).into_response()
}

fn profile_response(session: &Session) -> ProfileResponse {
    ProfileResponse {
        populated: session.profile.is_populated(),
        profile: session.profile.get(),
    }
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (HeaderMap, Json<ProfileResponse>) {
    let handle = state.sessions.open(session_id_from_headers(&headers)).await;
    let body = profile_response(&*handle.lock().await);
    (cookie_for(&handle), Json(body))
}

/// PUT /api/profile: replaces the whole profile.
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(profile): Json<PatientProfile>,
) -> Result<(HeaderMap, Json<ProfileResponse>), AppError> {
    profile.validate()?;
    let mut handle = state.sessions.open(session_id_from_headers(&headers)).await;
    let body = {
        let mut session = handle.lock().await;
        session.profile.save(profile);
        profile_response(&session)
    };
    state.sessions.keep(&mut handle).await;
    info!("Profile saved for session {}", handle.id());
    Ok((cookie_for(&handle), Json(body)))
}

/// POST /api/ask: same as the page's action buttons, as JSON. Leaves the session as it is.
pub async fn api_ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> Result<(HeaderMap, Json<AskResponse>), AppError> {
    let handle = state.sessions.open(session_id_from_headers(&headers)).await;
    let profile = handle.lock().await.profile.get();

    let answer = state
        .shell
        .ask(
            request.panel,
            &profile,
            &request.input,
            request.metric.as_deref(),
        )
        .await?;
    Ok((
        cookie_for(&handle),
        Json(AskResponse {
            panel: request.panel,
            prompt: answer.prompt,
            response: answer.response,
        }),
    ))
}

/// GET /api/analytics: summary and chart series for one metric.
///
/// Without `?metric=` the first metric column is used; an unknown metric is a 400.
pub async fn api_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let dataset = state.shell.dataset()?;
    let metric = match query.metric {
        Some(metric) => metric,
        None => resolve_metric(&dataset, None)
            .ok_or_else(|| AppError::InvalidDataset("no metric columns".to_string()))?,
    };
    let summary = dataset.describe(&metric)?;
    let series = dataset.series_for(&metric)?;
    Ok(Json(AnalyticsResponse {
        columns: dataset.columns().to_vec(),
        metric,
        summary,
        series,
    }))
}

/// DELETE /api/session
pub async fn api_end_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers) {
        state.sessions.end(id).await;
    }
    (StatusCode::NO_CONTENT, expired_session_cookie()).into_response()
}

/// All routes, with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/profile", post(save_profile))
        .route("/ask", post(ask))
        .route("/session/end", post(end_session))
        .route("/health", get(ping))
        .route("/api/profile", get(get_profile).put(put_profile))
        .route("/api/ask", post(api_ask))
        .route("/api/analytics", get(api_analytics))
        .route("/api/session", axum::routing::delete(api_end_session))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(state: Arc<AppState>) -> Result<(), AppError> {
    let addr = state.config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {addr}: {e}")))?;

    match listener.local_addr() {
        Ok(local) => info!("HealthAI listening on http://{local}"),
        Err(_) => info!("HealthAI listening on {addr}"),
    }

    axum::serve(listener, router(state).into_make_service())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}
