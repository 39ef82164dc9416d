use keyward_core::{KeywardError, KeywardResult};

/// Failures allowed before the identity locks.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Minimum length for a new credential.
pub const MIN_PASSWORD_LEN: usize = 6;

/// How long the identity stays locked after too many failures.
pub fn lockout_duration() -> chrono::Duration {
    chrono::Duration::hours(2)
}

/// Strength policy for new credentials: at least six characters, with at
/// least one letter and one digit.
pub fn check_strength(password: &str) -> KeywardResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(KeywardError::WeakCredential(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(KeywardError::WeakCredential(
            "password must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(KeywardError::WeakCredential(
            "password must contain at least one digit".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letter_and_digit_mix() {
        assert!(check_strength("abc123").is_ok());
        assert!(check_strength("admin123").is_ok());
        assert!(check_strength("X9aaaaa").is_ok());
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(check_strength("a1").is_err());
        assert!(check_strength("abc12").is_err());
    }

    #[test]
    fn rejects_letters_only() {
        assert!(check_strength("abcdefg").is_err());
    }

    #[test]
    fn rejects_digits_only() {
        assert!(check_strength("1234567").is_err());
    }
}
