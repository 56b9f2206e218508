// src/keys.rs

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::DecodingKey;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::{BigUint, RsaPublicKey};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::TokenError;
use crate::model::PublishedKey;

/// One verification key from a pool's published key set, with its public key
/// already reconstructed and ready for signature checks.
pub struct SigningKey {
    pub kid: String,
    pub alg: String,
    pub kty: String,
    pub use_purpose: String,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("kty", &self.kty)
            .field("use_purpose", &self.use_purpose)
            .field("decoding_key", &"<DecodingKey>")
            .finish()
    }
}

impl SigningKey {
    /// Builds a signing key directly from its published components,
    /// bypassing the key-set endpoint. Pairs with [`KeyStore::from_keys`].
    pub fn from_components(
        kid: impl Into<String>,
        alg: impl Into<String>,
        kty: impl Into<String>,
        use_purpose: impl Into<String>,
        n_b64: &str,
        e_b64: &str,
    ) -> Result<Self, TokenError> {
        let public_key = decode_rsa_components(n_b64, e_b64)?;
        Ok(Self {
            kid: kid.into(),
            alg: alg.into(),
            kty: kty.into(),
            use_purpose: use_purpose.into(),
            decoding_key: to_decoding_key(&public_key)?,
        })
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// The complete set of trusted signing keys for one or more user pools,
/// indexed by key id.
///
/// Built once before any validation traffic is served and never mutated
/// afterwards, so it is safe to read from any number of concurrent
/// validation calls. There is no refresh: a pool rotating its keys after
/// construction surfaces as [`TokenError::UnknownSigningKey`] until the
/// store is rebuilt.
#[derive(Debug)]
pub struct KeyStore {
    keys: HashMap<String, SigningKey>,
    issuer_prefix: String,
    pool_ids: Vec<String>,
}

impl KeyStore {
    /// Downloads and indexes the published key set of every trusted pool.
    ///
    /// A single failed fetch or parse fails the whole construction; the
    /// service must not start serving with a partially built trust store.
    /// If two pools publish the same key id, the later pool wins.
    #[instrument(skip(config), err)]
    pub async fn build(config: &Config) -> Result<Self, TokenError> {
        let http = reqwest::Client::new();
        let mut keys = HashMap::new();
        for pool_id in &config.pool_ids {
            let fetched = fetch_pool_keys(&http, config, pool_id).await?;
            debug!(pool_id = %pool_id, count = fetched.len(), "fetched pool key set");
            for key in fetched {
                keys.insert(key.kid.clone(), key);
            }
        }
        Ok(Self {
            keys,
            issuer_prefix: config.issuer_prefix(),
            pool_ids: config.pool_ids.clone(),
        })
    }

    /// Builds a store from already-reconstructed keys, bypassing the
    /// network entirely.
    pub fn from_keys(config: &Config, keys: HashMap<String, SigningKey>) -> Self {
        Self {
            keys,
            issuer_prefix: config.issuer_prefix(),
            pool_ids: config.pool_ids.clone(),
        }
    }

    /// Number of keys held by the store.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn key(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.get(kid)
    }

    pub(crate) fn issuer_prefix(&self) -> &str {
        &self.issuer_prefix
    }

    pub(crate) fn is_trusted_pool(&self, pool_id: &str) -> bool {
        self.pool_ids.iter().any(|p| p == pool_id)
    }
}

#[instrument(skip(http, config), err)]
async fn fetch_pool_keys(
    http: &reqwest::Client,
    config: &Config,
    pool_id: &str,
) -> Result<Vec<SigningKey>, TokenError> {
    let url = config.jwks_url(pool_id);
    let response = http
        .get(&url)
        .timeout(config.http_timeout)
        .send()
        .await
        .map_err(|e| TokenError::KeySetFetchFailed {
            pool_id: pool_id.to_string(),
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TokenError::KeySetFetchFailed {
            pool_id: pool_id.to_string(),
            detail: format!("status code {status}"),
        });
    }

    let published: Vec<PublishedKey> =
        response
            .json()
            .await
            .map_err(|e| TokenError::KeySetParseFailed {
                pool_id: pool_id.to_string(),
                detail: e.to_string(),
            })?;

    let mut keys = Vec::with_capacity(published.len());
    for entry in published {
        let key = SigningKey::from_components(
            entry.kid.clone(),
            entry.alg,
            entry.kty,
            entry.use_purpose,
            &entry.n,
            &entry.e,
        )
        .map_err(|e| TokenError::KeySetParseFailed {
            pool_id: pool_id.to_string(),
            detail: format!("key '{}': {e}", entry.kid),
        })?;
        keys.push(key);
    }
    Ok(keys)
}

/// Reconstructs an RSA public key from the base64-encoded modulus and
/// exponent published in a key-set document.
///
/// Both components use the standard base64 alphabet. The modulus bytes are
/// read as a big-endian unsigned integer. The exponent is conventionally
/// short (3 bytes for 65537); shorter-than-8-byte encodings are left-padded
/// with zeros before the big-endian read, so any valid short encoding
/// reconstructs the same value regardless of how many leading zero bytes it
/// carries.
pub fn decode_rsa_components(n_b64: &str, e_b64: &str) -> Result<RsaPublicKey, TokenError> {
    let n_bytes = STANDARD
        .decode(n_b64)
        .map_err(|e| TokenError::MalformedKeyComponent {
            component: "n",
            detail: e.to_string(),
        })?;
    let n = BigUint::from_bytes_be(&n_bytes);

    let e_bytes = STANDARD
        .decode(e_b64)
        .map_err(|e| TokenError::MalformedKeyComponent {
            component: "e",
            detail: e.to_string(),
        })?;
    let e = BigUint::from(exponent_value(&e_bytes));

    RsaPublicKey::new(n, e).map_err(|e| TokenError::MalformedKeyComponent {
        component: "public key",
        detail: e.to_string(),
    })
}

fn exponent_value(raw: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    if raw.len() < 8 {
        buf[8 - raw.len()..].copy_from_slice(raw);
    } else {
        buf.copy_from_slice(&raw[..8]);
    }
    u64::from_be_bytes(buf)
}

fn to_decoding_key(public_key: &RsaPublicKey) -> Result<DecodingKey, TokenError> {
    let der = public_key
        .to_pkcs1_der()
        .map_err(|e| TokenError::MalformedKeyComponent {
            component: "public key",
            detail: e.to_string(),
        })?;
    Ok(DecodingKey::from_rsa_der(der.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_exponent_is_left_padded() {
        // 65537 in its conventional 3-byte encoding.
        assert_eq!(exponent_value(&[0x01, 0x00, 0x01]), 65537);
    }

    #[test]
    fn leading_zero_bytes_do_not_change_the_exponent() {
        let three_byte = exponent_value(&[0x01, 0x00, 0x01]);
        let four_byte = exponent_value(&[0x00, 0x01, 0x00, 0x01]);
        let full_width = exponent_value(&[0, 0, 0, 0, 0, 0x01, 0x00, 0x01]);

        assert_eq!(three_byte, 65537);
        assert_eq!(four_byte, 65537);
        assert_eq!(full_width, 65537);
    }

    #[test]
    fn single_byte_exponent_parses() {
        assert_eq!(exponent_value(&[0x03]), 3);
    }

    #[test]
    fn bad_modulus_base64_is_a_malformed_component() {
        let err = decode_rsa_components("!!not base64!!", "AQAB").unwrap_err();
        assert!(matches!(
            err,
            TokenError::MalformedKeyComponent { component: "n", .. }
        ));
    }

    #[test]
    fn bad_exponent_base64_is_a_malformed_component() {
        // A structurally valid (odd, large enough) modulus so the failure is
        // attributable to the exponent alone.
        let n = STANDARD.encode([0x01; 256]);
        let err = decode_rsa_components(&n, "***").unwrap_err();
        assert!(matches!(
            err,
            TokenError::MalformedKeyComponent { component: "e", .. }
        ));
    }
}
