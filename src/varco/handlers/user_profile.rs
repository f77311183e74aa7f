use crate::{
    auth::{gate, session, Gate, GateMode},
    varco::sessions::{self, SessionStore},
};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub user_id: String,
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 303, description = "Anonymous caller, redirected to the login page"),
    ),
    tag = "auth"
)]
pub async fn profile(
    headers: HeaderMap,
    store: Extension<Arc<SessionStore>>,
) -> impl IntoResponse {
    let context = sessions::resolve_context(&headers, &store).await;
    match gate(&context, GateMode::RequireAuthenticated) {
        Gate::Allow(Some(identity)) => Json(ProfileResponse {
            user_id: identity.id.to_string(),
            username: identity.username,
        })
        .into_response(),
        // RequireAuthenticated never allows an anonymous caller; fail closed
        Gate::Allow(None) | Gate::Deny { .. } => {
            Redirect::to(session::LOGIN_REDIRECT).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_response_round_trips() -> anyhow::Result<()> {
        let response = ProfileResponse {
            user_id: "00000000-0000-0000-0000-000000000000".to_string(),
            username: "alice".to_string(),
        };
        let value = serde_json::to_value(&response)?;
        let decoded: ProfileResponse = serde_json::from_value(value)?;
        assert_eq!(decoded.username, "alice");
        Ok(())
    }
}
