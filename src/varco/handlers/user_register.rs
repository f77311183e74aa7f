use crate::{
    auth::{self, gate, session, Gate, GateMode, RegisterDenied, RegisterOutcome},
    varco::sessions::{self, SessionStore},
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserRegister {
    username: String,
    #[schema(value_type = String)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body = UserRegister,
    responses(
        (status = 303, description = "Registration successful, redirected to the profile page"),
        (status = 400, description = "Missing fields or weak password", body = String),
        (status = 409, description = "Username already taken", body = String),
        (status = 422, description = "Identity rejected by the directory", body = String),
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    store: Extension<Arc<SessionStore>>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    // Signed-in callers have nothing to register
    let context = sessions::resolve_context(&headers, &store).await;
    if let Gate::Deny { redirect } = gate(&context, GateMode::RequireAnonymous) {
        return Redirect::to(redirect).into_response();
    }

    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("user: {:?}", user);

    match auth::register(&pool, &user.username, user.password.expose_secret()).await {
        Ok(RegisterOutcome::Created(identity)) => {
            debug!(username = %identity.username, "registration successful");

            // Registration does not log the user in; the profile gate sends
            // fresh accounts on to the login form.
            Redirect::to(session::PROFILE_REDIRECT).into_response()
        }
        Ok(RegisterOutcome::Denied(denied)) => denied_response(&denied).into_response(),
        Err(err) => {
            error!("Registration failed: {:?}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}

fn denied_response(denied: &RegisterDenied) -> (StatusCode, String) {
    match denied {
        RegisterDenied::MissingFields => (
            StatusCode::BAD_REQUEST,
            "Username and password are required".to_string(),
        ),
        RegisterDenied::WeakPassword => (
            StatusCode::BAD_REQUEST,
            "Password needs at least 6 characters, including a digit, a lowercase and an uppercase letter".to_string(),
        ),
        RegisterDenied::UsernameTaken => (
            StatusCode::CONFLICT,
            "Username already taken".to_string(),
        ),
        RegisterDenied::InvalidIdentity(reason) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid identity: {reason}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_and_redacts_password() -> anyhow::Result<()> {
        let user: UserRegister =
            serde_json::from_str(r#"{"username":"alice","password":"Secret1"}"#)?;
        assert_eq!(user.username, "alice");
        assert_eq!(user.password.expose_secret(), "Secret1");

        // Raw password must never reach the logs
        assert!(!format!("{user:?}").contains("Secret1"));
        Ok(())
    }

    #[test]
    fn denial_status_mapping() {
        assert_eq!(
            denied_response(&RegisterDenied::MissingFields).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            denied_response(&RegisterDenied::WeakPassword).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            denied_response(&RegisterDenied::UsernameTaken).0,
            StatusCode::CONFLICT
        );

        let (status, message) =
            denied_response(&RegisterDenied::InvalidIdentity("blank username".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(message.contains("blank username"));
    }
}
