// src/claim.rs

use serde_json::{Map, Value};

use crate::error::TokenError;

/// The verified contents of one token.
///
/// A `Claim` is produced by a successful validation (or assembled directly
/// for test doubles) and is immutable afterwards. The subject is the token's
/// `sub` claim; the role is the user pool id derived from its `iss` claim.
///
/// The typed accessors are strict: a claim of a different underlying JSON
/// type is a [`TokenError::ClaimTypeMismatch`], never a silent conversion.
/// In particular integers do not satisfy the float accessors and floats do
/// not satisfy the integer accessors.
#[derive(Debug, Clone)]
pub struct Claim {
    subject: String,
    role: String,
    claims: Map<String, Value>,
}

impl Claim {
    /// Assembles a claim bag directly. Used by validators, and by test
    /// doubles that need a preset claim.
    pub fn new(
        subject: impl Into<String>,
        role: impl Into<String>,
        claims: Map<String, Value>,
    ) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
            claims,
        }
    }

    /// The authenticated subject identifier (the `sub` claim).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns true if this claim is for the provided subject.
    pub fn is_subject(&self, candidate: &str) -> bool {
        self.subject == candidate
    }

    /// The user pool id this token was issued under.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns true if this claim was issued under the provided pool.
    pub fn is_role(&self, candidate: &str) -> bool {
        self.role == candidate
    }

    /// Returns the raw claim value, or [`TokenError::ClaimNotFound`] if no
    /// claim with that name exists.
    pub fn get(&self, name: &str) -> Result<&Value, TokenError> {
        self.claims
            .get(name)
            .ok_or_else(|| TokenError::ClaimNotFound(name.to_string()))
    }

    /// Returns the claim as a string slice.
    pub fn get_str(&self, name: &str) -> Result<&str, TokenError> {
        match self.get(name)? {
            Value::String(s) => Ok(s),
            _ => Err(mismatch(name, "string")),
        }
    }

    /// Returns the claim as a bool.
    pub fn get_bool(&self, name: &str) -> Result<bool, TokenError> {
        match self.get(name)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch(name, "bool")),
        }
    }

    /// Returns the claim as an i64. Floating-point claims do not qualify.
    pub fn get_i64(&self, name: &str) -> Result<i64, TokenError> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(name, "i64")),
            _ => Err(mismatch(name, "i64")),
        }
    }

    /// Returns the claim as an i32. Integers outside the i32 range do not
    /// qualify.
    pub fn get_i32(&self, name: &str) -> Result<i32, TokenError> {
        let wide = match self.get(name)? {
            Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(name, "i32"))?,
            _ => return Err(mismatch(name, "i32")),
        };
        i32::try_from(wide).map_err(|_| mismatch(name, "i32"))
    }

    /// Returns the claim as an f64. Integer claims do not qualify.
    pub fn get_f64(&self, name: &str) -> Result<f64, TokenError> {
        match self.get(name)? {
            Value::Number(n) if n.is_f64() => Ok(n.as_f64().unwrap_or_default()),
            _ => Err(mismatch(name, "f64")),
        }
    }

    /// Returns the claim as an f32. Integer claims do not qualify.
    pub fn get_f32(&self, name: &str) -> Result<f32, TokenError> {
        match self.get(name)? {
            Value::Number(n) if n.is_f64() => Ok(n.as_f64().unwrap_or_default() as f32),
            _ => Err(mismatch(name, "f32")),
        }
    }
}

fn mismatch(name: &str, expected: &'static str) -> TokenError {
    TokenError::ClaimTypeMismatch {
        claim: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Claim {
        let mut claims = Map::new();
        claims.insert("bool".to_string(), json!(true));
        claims.insert("float".to_string(), json!(123.45));
        claims.insert("int".to_string(), json!(123));
        claims.insert("big".to_string(), json!(i64::from(i32::MAX) + 1));
        claims.insert("string".to_string(), json!("foobar"));
        Claim::new("user-1", "pool-a", claims)
    }

    #[test]
    fn subject_and_role_accessors() {
        let claim = sample();
        assert_eq!(claim.subject(), "user-1");
        assert_eq!(claim.role(), "pool-a");
        assert!(claim.is_subject("user-1"));
        assert!(!claim.is_subject("user-2"));
        assert!(claim.is_role("pool-a"));
        assert!(!claim.is_role("pool-b"));
    }

    #[test]
    fn get_returns_raw_value_or_not_found() {
        let claim = sample();
        assert_eq!(claim.get("string").unwrap(), &json!("foobar"));
        assert!(matches!(
            claim.get("noValue").unwrap_err(),
            TokenError::ClaimNotFound(name) if name == "noValue"
        ));
    }

    #[test]
    fn typed_accessors_return_their_own_type() {
        let claim = sample();
        assert_eq!(claim.get_str("string").unwrap(), "foobar");
        assert!(claim.get_bool("bool").unwrap());
        assert_eq!(claim.get_i64("int").unwrap(), 123);
        assert_eq!(claim.get_i32("int").unwrap(), 123);
        assert!((claim.get_f64("float").unwrap() - 123.45).abs() < 1e-9);
        assert!((claim.get_f32("float").unwrap() - 123.45).abs() < 1e-4);
    }

    #[test]
    fn accessors_never_coerce_across_types() {
        let claim = sample();
        // string claim is only a string
        assert!(matches!(
            claim.get_bool("string").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
        // integer claim does not satisfy float accessors
        assert!(matches!(
            claim.get_f64("int").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
        assert!(matches!(
            claim.get_f32("int").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
        // float claim does not satisfy integer accessors
        assert!(matches!(
            claim.get_i64("float").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
        assert!(matches!(
            claim.get_i32("float").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
        // bool claim is not a string
        assert!(matches!(
            claim.get_str("bool").unwrap_err(),
            TokenError::ClaimTypeMismatch { .. }
        ));
    }

    #[test]
    fn i32_accessor_rejects_out_of_range_integers() {
        let claim = sample();
        assert_eq!(claim.get_i64("big").unwrap(), i64::from(i32::MAX) + 1);
        assert!(matches!(
            claim.get_i32("big").unwrap_err(),
            TokenError::ClaimTypeMismatch { claim, .. } if claim == "big"
        ));
    }

    #[test]
    fn missing_claim_is_not_found_for_every_accessor() {
        let claim = sample();
        assert!(matches!(
            claim.get_str("noValue").unwrap_err(),
            TokenError::ClaimNotFound(_)
        ));
        assert!(matches!(
            claim.get_i64("noValue").unwrap_err(),
            TokenError::ClaimNotFound(_)
        ));
        assert!(matches!(
            claim.get_f64("noValue").unwrap_err(),
            TokenError::ClaimNotFound(_)
        ));
    }
}
