use subtle::ConstantTimeEq;

/// Compares two strings in constant time to prevent timing attacks
///
/// # Arguments
/// * `a` - First string to compare
/// * `b` - Second string to compare
///
/// # Returns
/// * `bool` - True if strings are equal, false otherwise
pub fn constant_time_equal(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// The pre-shared secret expected from trusted internal callers.
///
/// Wraps the configured value so it can be stored in app data without ever
/// rendering in debug output, and so comparison is always constant-time.
#[derive(Clone)]
pub struct ServiceSecret(String);

impl ServiceSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Constant-time comparison of the presented header value against the
    /// configured secret. Comparison time must not vary observably with
    /// mismatch position.
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_equal(&self.0, presented)
    }
}

impl std::fmt::Debug for ServiceSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_equal_same_strings() {
        assert!(constant_time_equal("test_string", "test_string"));
    }

    #[test]
    fn test_constant_time_equal_different_strings() {
        assert!(!constant_time_equal("test_string_1", "test_string_2"));
    }

    #[test]
    fn test_constant_time_equal_different_lengths() {
        assert!(!constant_time_equal("short", "much_longer_string"));
    }

    #[test]
    fn test_constant_time_equal_empty_strings() {
        assert!(constant_time_equal("", ""));
    }

    #[test]
    fn test_service_secret_rejects_prefix_and_suffix_variants() {
        let secret = ServiceSecret::new("secretA");
        assert!(secret.matches("secretA"));
        assert!(!secret.matches("secret"));
        assert!(!secret.matches("secretAA"));
        assert!(!secret.matches("AsecretA"));
        assert!(!secret.matches(""));
        assert!(!secret.matches("secretB"));
    }

    #[test]
    fn test_service_secret_debug_is_redacted() {
        let secret = ServiceSecret::new("do-not-log-me");
        assert_eq!(format!("{:?}", secret), "ServiceSecret(<redacted>)");
    }
}
