// src/mock.rs

use crate::claim::Claim;
use crate::error::TokenError;
use crate::validator::TokenValidator;

/// A validator that returns a preset result without inspecting the token.
///
/// Lets callers exercise code behind the [`TokenValidator`] seam without
/// real keys or tokens.
pub struct MockValidator {
    result: Result<Claim, TokenError>,
}

impl MockValidator {
    /// Creates a mock that returns the given result for every call.
    pub fn new(result: Result<Claim, TokenError>) -> Self {
        Self { result }
    }
}

impl TokenValidator for MockValidator {
    fn validate(&self, _token: &str) -> Result<Claim, TokenError> {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn returns_preset_claim_for_any_token() {
        let claim = Claim::new("user-1", "pool-a", Map::new());
        let mock = MockValidator::new(Ok(claim));

        let first = mock.validate("whatever").unwrap();
        let second = mock.validate("something else").unwrap();
        assert_eq!(first.subject(), "user-1");
        assert_eq!(second.role(), "pool-a");
    }

    #[test]
    fn returns_preset_error_for_any_token() {
        let mock = MockValidator::new(Err(TokenError::TokenExpired));
        assert!(matches!(
            mock.validate("whatever").unwrap_err(),
            TokenError::TokenExpired
        ));
    }
}
