use crate::{
    auth::{self, gate, Gate, GateMode},
    varco::sessions::{self, SessionStore},
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    post,
    path = "/user/logout",
    responses(
        (status = 303, description = "Session destroyed, redirected to the landing page"),
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    store: Extension<Arc<SessionStore>>,
) -> impl IntoResponse {
    let mut context = sessions::resolve_context(&headers, &store).await;
    if let Gate::Deny { redirect } = gate(&context, GateMode::RequireAuthenticated) {
        return Redirect::to(redirect).into_response();
    }

    auth::logout(&mut context);
    if let Some(token) = sessions::extract_session_token(&headers) {
        store.remove(&token).await;
    }

    debug!("session destroyed");

    // Always clear the cookie, even if the store had no matching session.
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, sessions::clear_session_cookie());

    (response_headers, Redirect::to("/")).into_response()
}
