// src/model.rs

use serde::Deserialize;

/// One published key entry, as served by a user pool's key-set endpoint.
///
/// The endpoint returns a bare JSON array of these entries.
#[derive(Debug, Deserialize)]
pub struct PublishedKey {
    pub alg: String,
    pub e: String,
    pub kid: String,
    pub kty: String,
    pub n: String,
    #[serde(rename = "use")]
    pub use_purpose: String,
}
