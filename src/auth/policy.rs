//! Input policy for registration and login attempts.

/// Both credential fields must be present and non-empty. Usernames carry no
/// format requirement beyond presence.
#[must_use]
pub fn fields_present(username: &str, password: &str) -> bool {
    !username.is_empty() && !password.is_empty()
}

/// Password strength: at least 6 characters containing at least one ASCII
/// digit, one lowercase and one uppercase letter.
#[must_use]
pub fn strong_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}
