//! Request-scoped session state and the access gate.

use crate::auth::directory::Identity;

/// Redirect target for denied access to protected resources.
pub const LOGIN_REDIRECT: &str = "/user/login";
/// Redirect target for authenticated callers hitting anonymous-only flows.
pub const PROFILE_REDIRECT: &str = "/user/profile";

/// Per-request session state: anonymous, or bound to exactly one identity.
///
/// The transport layer materializes a context at the start of a request and
/// persists the outcome when the request ends. Flows receive the context
/// explicitly; there is no process-wide session singleton.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionContext {
    identity: Option<Identity>,
}

impl SessionContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Bind the context to an identity, replacing any previous binding.
    pub fn establish(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Drop the binding. Clearing an anonymous context is a no-op.
    pub fn clear(&mut self) {
        self.identity = None;
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Which session state an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    RequireAuthenticated,
    RequireAnonymous,
}

/// Gate decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Proceed; carries the authenticated identity when one is required.
    Allow(Option<Identity>),
    /// Turn the caller away toward `redirect`. Not an error, no side effects.
    Deny { redirect: &'static str },
}

/// Decide whether the current session may perform an operation.
#[must_use]
pub fn gate(session: &SessionContext, mode: GateMode) -> Gate {
    match mode {
        GateMode::RequireAuthenticated => match session.identity() {
            Some(identity) => Gate::Allow(Some(identity.clone())),
            None => Gate::Deny {
                redirect: LOGIN_REDIRECT,
            },
        },
        GateMode::RequireAnonymous => {
            if session.is_authenticated() {
                Gate::Deny {
                    redirect: PROFILE_REDIRECT,
                }
            } else {
                Gate::Allow(None)
            }
        }
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
    fn context_starts_anonymous() {
        let session = SessionContext::default();
        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);
        assert_eq!(session, SessionContext::anonymous());
    }

    #[test]
    fn establish_then_clear_round_trips() {
        let identity = alice();
        let mut session = SessionContext::anonymous();

        session.establish(identity.clone());
        assert!(session.is_authenticated());
        assert_eq!(session.identity(), Some(&identity));

        session.clear();
        assert!(!session.is_authenticated());

        // Clearing again is a no-op, not an error
        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn establish_replaces_previous_identity() {
        let mut session = SessionContext::authenticated(alice());
        let bob = Identity {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
        };

        session.establish(bob.clone());
        assert_eq!(session.identity(), Some(&bob));
    }

    #[test]
    fn require_authenticated_denies_anonymous() {
        let session = SessionContext::anonymous();
        assert_eq!(
            gate(&session, GateMode::RequireAuthenticated),
            Gate::Deny {
                redirect: LOGIN_REDIRECT
            }
        );
    }

    #[test]
    fn require_authenticated_allows_and_passes_identity() {
        let identity = alice();
        let session = SessionContext::authenticated(identity.clone());
        assert_eq!(
            gate(&session, GateMode::RequireAuthenticated),
            Gate::Allow(Some(identity))
        );
    }

    #[test]
    fn require_anonymous_is_the_exact_complement() {
        let anonymous = SessionContext::anonymous();
        let authenticated = SessionContext::authenticated(alice());

        assert_eq!(gate(&anonymous, GateMode::RequireAnonymous), Gate::Allow(None));
        assert_eq!(
            gate(&authenticated, GateMode::RequireAnonymous),
            Gate::Deny {
                redirect: PROFILE_REDIRECT
            }
        );
    }
}
