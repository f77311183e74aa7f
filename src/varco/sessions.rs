//! Opaque session tokens and the keyed session store.
//!
//! The store is the "current session" slot the auth core reads and writes
//! through [`SessionContext`](crate::auth::SessionContext); how tokens travel
//! (cookie or bearer header) is decided here, not in the core.

use anyhow::{anyhow, Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::RwLock;

use crate::auth::{Identity, SessionContext};

pub const SESSION_COOKIE_NAME: &str = "varco_session";

/// In-process keyed store from session-token hash to identity.
///
/// Raw tokens exist only in the cookie/header; the map is keyed by their
/// SHA-256 so the raw value is never held beyond the request that carries it.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Vec<u8>, Identity>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a session for `identity` and return the raw token for the
    /// cookie.
    ///
    /// # Errors
    /// Returns an error if no unique token can be generated.
    pub async fn insert(&self, identity: Identity) -> Result<String> {
        let mut sessions = self.sessions.write().await;

        for _ in 0..3 {
            let token = generate_session_token()?;
            let token_hash = hash_session_token(&token);
            if let Entry::Vacant(entry) = sessions.entry(token_hash) {
                entry.insert(identity.clone());
                return Ok(token);
            }
        }

        Err(anyhow!("failed to generate unique session token"))
    }

    /// Resolve a raw token to its identity, if the session exists.
    pub async fn resolve(&self, token: &str) -> Option<Identity> {
        let token_hash = hash_session_token(token);
        self.sessions.read().await.get(&token_hash).cloned()
    }

    /// Destroy a session. Removing an absent session is a no-op.
    pub async fn remove(&self, token: &str) {
        let token_hash = hash_session_token(token);
        self.sessions.write().await.remove(&token_hash);
    }
}

/// Materialize the request's session context from its headers.
pub async fn resolve_context(headers: &HeaderMap, store: &SessionStore) -> SessionContext {
    match extract_session_token(headers) {
        Some(token) => match store.resolve(&token).await {
            Some(identity) => SessionContext::authenticated(identity),
            None => SessionContext::anonymous(),
        },
        None => SessionContext::anonymous(),
    }
}

/// Create a new session token.
/// The raw value is only returned to set the cookie; the store keys by hash.
fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never reach the store.
fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Build the `HttpOnly` cookie carrying the session token.
///
/// # Errors
/// Returns an error if the token produces an invalid header value.
pub fn session_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

/// Cookie that expires the session client-side.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("varco_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull the session token from the cookie, falling back to a bearer
/// `Authorization` header for non-browser clients.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn alice() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn generated_tokens_decode_to_32_bytes() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| {
                base64::engine::general_purpose::URL_SAFE_NO_PAD
                    .decode(token.as_bytes())
                    .ok()
            })
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }

    #[tokio::test]
    async fn insert_resolve_remove_round_trip() -> anyhow::Result<()> {
        let store = SessionStore::new();
        let identity = alice();

        let token = store.insert(identity.clone()).await?;
        assert_eq!(store.resolve(&token).await, Some(identity));

        store.remove(&token).await;
        assert_eq!(store.resolve(&token).await, None);

        // Removing again is a no-op
        store.remove(&token).await;
        Ok(())
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_tokens() -> anyhow::Result<()> {
        let store = SessionStore::new();

        let first = store.insert(alice()).await?;
        let second = store.insert(alice()).await?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn extract_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; varco_session=abc123; theme=dark"),
        );
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("varco_session=cookie-token"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(
            extract_session_token(&headers),
            Some("header-token".to_string())
        );
    }

    #[test]
    fn extract_token_rejects_empty_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn extract_token_none_when_absent() {
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_carries_token_and_flags() -> anyhow::Result<()> {
        let cookie = session_cookie("abc123")?;
        let value = cookie.to_str()?;
        assert!(value.starts_with("varco_session=abc123"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = clear_session_cookie();
        assert!(value.to_str().is_ok_and(|v| v.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn resolve_context_maps_store_state() -> anyhow::Result<()> {
        let store = SessionStore::new();
        let identity = alice();
        let token = store.insert(identity.clone()).await?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, session_cookie(&token)?);
        let context = resolve_context(&headers, &store).await;
        assert_eq!(context.identity(), Some(&identity));

        // Unknown token and missing header both mean anonymous
        let mut stale = HeaderMap::new();
        stale.insert(COOKIE, HeaderValue::from_static("varco_session=stale"));
        assert!(!resolve_context(&stale, &store).await.is_authenticated());
        assert!(!resolve_context(&HeaderMap::new(), &store)
            .await
            .is_authenticated());
        Ok(())
    }
}
