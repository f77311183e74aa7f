//! # Varco (Credential & Session Authority)
//!
//! `varco` registers users with hashed credentials, authenticates login
//! attempts, and gates access to protected resources based on an active
//! session.
//!
//! ## Identities
//!
//! An identity is a unique username plus an Argon2 password hash. The raw
//! password never reaches the database; uniqueness is enforced by the
//! `users` unique index, never by a select-then-insert.
//!
//! ## Sessions
//!
//! A session is request-scoped state with exactly two shapes: anonymous, or
//! bound to one previously registered identity. Login is the only transition
//! into the authenticated state and logout the only transition out; there is
//! no per-request re-validation against the directory, so deleting a user
//! does not retroactively invalidate a live session.
//!
//! ## Disclosure
//!
//! Unknown usernames and wrong passwords are reported distinctly. This is a
//! deliberate UX choice, not a security posture; single out this behavior
//! before deploying into a hostile environment.

pub mod auth;
pub mod cli;
pub mod varco;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
