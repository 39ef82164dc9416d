/// Length in bytes of the randomness behind a session token.
const TOKEN_BYTES: usize = 32;

/// Generate an opaque session token: 32 bytes from the thread RNG, hex
/// encoded. The token carries no structure; it is only ever compared
/// against the session store.
pub fn generate_session_token() -> String {
    hex::encode(rand::random::<[u8; TOKEN_BYTES]>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }
}
