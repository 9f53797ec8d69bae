use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Checks a sign-up payload, returning the reason shown to the client on failure.
pub fn validate_signup(username: &str, password: &str, email: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username required".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Invalid Email".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("Password less than {MIN_PASSWORD_LEN} chars"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_payload() {
        assert!(validate_signup("ann", "hunter2hunter2", "ann@acme.io").is_ok());
        assert!(validate_signup("bo", "12345678", "bo.smith+tag@mail.example.org").is_ok());
    }

    #[test]
    fn test_rejects_malformed_email() {
        for email in ["", "ann", "ann@", "@acme.io", "ann@acme", "ann acme@x.io"] {
            assert_eq!(
                validate_signup("ann", "hunter2hunter2", email),
                Err("Invalid Email".to_string()),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(
            validate_signup("ann", "1234567", "ann@acme.io"),
            Err("Password less than 8 chars".to_string())
        );
    }

    #[test]
    fn test_rejects_blank_username() {
        assert!(validate_signup("  ", "hunter2hunter2", "ann@acme.io").is_err());
    }
}
