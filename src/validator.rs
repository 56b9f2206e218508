// src/validator.rs

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::claim::Claim;
use crate::error::TokenError;
use crate::keys::KeyStore;

/// Capability to turn a raw token string into a verified [`Claim`].
///
/// Implemented by [`CognitoValidator`] and by the deterministic
/// [`crate::mock::MockValidator`] so that callers can depend on the seam
/// rather than on real key material.
pub trait TokenValidator {
    /// Validates the token and returns its claims, or the first failure
    /// encountered. Never retries; a token that failed once will fail
    /// identically on resubmission.
    fn validate(&self, token: &str) -> Result<Claim, TokenError>;
}

const RSA_ALGORITHMS: &[Algorithm] = &[Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// The verifying validator for user pool tokens.
///
/// Holds the completed [`KeyStore`] and performs a fixed, single-pass check
/// sequence per token: signature, `sub`, `iss` prefix, pool membership,
/// expiration. `validate` is read-only over the store and safe to call from
/// any number of threads.
pub struct CognitoValidator {
    store: KeyStore,
}

impl CognitoValidator {
    /// Creates a validator over a completed key store.
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }
}

impl TokenValidator for CognitoValidator {
    #[instrument(skip(self, token), err)]
    fn validate(&self, token: &str) -> Result<Claim, TokenError> {
        let header =
            decode_header(token).map_err(|e| TokenError::InvalidSignature(e.to_string()))?;

        if !RSA_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::UnknownSigningKey("kid header absent".to_string()))?;
        let key = self
            .store
            .key(&kid)
            .ok_or(TokenError::UnknownSigningKey(kid))?;

        // Signature verification only; the claim checks below are done by
        // hand because `exp` is carried as a decimal string, not a number.
        let mut checks = Validation::new(header.alg);
        checks.validate_exp = false;
        checks.validate_aud = false;
        checks.validate_nbf = false;
        checks.required_spec_claims.clear();

        let claims = decode::<Map<String, Value>>(token, key.decoding_key(), &checks)
            .map_err(|e| TokenError::InvalidSignature(e.to_string()))?
            .claims;

        let subject = match claims.get("sub") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(TokenError::MalformedClaim("sub")),
            None => return Err(TokenError::MissingClaim("sub")),
        };

        let issuer = match claims.get("iss") {
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(TokenError::MalformedClaim("iss")),
            None => return Err(TokenError::MissingClaim("iss")),
        };
        let role = issuer
            .strip_prefix(self.store.issuer_prefix())
            .ok_or_else(|| TokenError::IssuerMismatch {
                found: issuer.to_string(),
                expected: self.store.issuer_prefix().to_string(),
            })?
            .to_string();

        if !self.store.is_trusted_pool(&role) {
            return Err(TokenError::UntrustedPool(role));
        }

        // Expiration is enforced only when the claim is present, and the
        // value is the string-encoded decimal form of a Unix timestamp.
        if let Some(exp) = claims.get("exp") {
            let expires_at = match exp {
                Value::String(s) => s
                    .parse::<i64>()
                    .map_err(|_| TokenError::MalformedClaim("exp"))?,
                _ => return Err(TokenError::MalformedClaim("exp")),
            };
            if expires_at < unix_now() {
                return Err(TokenError::TokenExpired);
            }
        }

        debug!(subject = %subject, role = %role, "token validated");
        Ok(Claim::new(subject, role, claims))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
