// src/error.rs

use thiserror::Error;

/// The primary error type for the `cognito-guard` library.
///
/// Every failure is a distinct variant carrying the identifiers (pool id,
/// key id, claim name) needed to diagnose it. Key material itself never
/// appears in a message.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("A required configuration field is missing: {0}")]
    MissingConfiguration(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not download key set for pool '{pool_id}': {detail}")]
    KeySetFetchFailed { pool_id: String, detail: String },

    #[error("Could not parse key set for pool '{pool_id}': {detail}")]
    KeySetParseFailed { pool_id: String, detail: String },

    #[error("Malformed key material ({component}): {detail}")]
    MalformedKeyComponent {
        component: &'static str,
        detail: String,
    },

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("No signing key available for kid: {0}")]
    UnknownSigningKey(String),

    #[error("Token signature is invalid: {0}")]
    InvalidSignature(String),

    #[error("Token is missing the '{0}' claim")]
    MissingClaim(&'static str),

    #[error("Token claim '{0}' is not properly formatted")]
    MalformedClaim(&'static str),

    #[error("Token issuer [{found}] does not match expected issuer prefix [{expected}]")]
    IssuerMismatch { found: String, expected: String },

    #[error("Token pool id [{0}] is not trusted")]
    UntrustedPool(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Claim '{0}' does not exist")]
    ClaimNotFound(String),

    #[error("Claim '{claim}' is not a {expected}")]
    ClaimTypeMismatch {
        claim: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context_identifiers() {
        let err = TokenError::KeySetFetchFailed {
            pool_id: "us-east-1_abc".into(),
            detail: "status code 503".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not download key set for pool 'us-east-1_abc': status code 503"
        );

        let err = TokenError::UnknownSigningKey("key-1".into());
        assert_eq!(err.to_string(), "No signing key available for kid: key-1");

        let err = TokenError::MissingClaim("sub");
        assert_eq!(err.to_string(), "Token is missing the 'sub' claim");

        let err = TokenError::ClaimTypeMismatch {
            claim: "exp".into(),
            expected: "string",
        };
        assert_eq!(err.to_string(), "Claim 'exp' is not a string");
    }
}
