// src/config.rs

use crate::error::TokenError;
use std::time::Duration;
use url::Url;

/// The main configuration for building a [`crate::keys::KeyStore`].
///
/// Holds the provider region, the set of trusted user pool ids, and the
/// derivation context for the issuer prefix and per-pool key-set URLs. It
/// should be constructed using the [`ConfigBuilder`].
#[derive(Debug, Clone)]
pub struct Config {
    /// The provider region, e.g. "us-east-1".
    pub region: String,
    /// The user pool ids whose tokens are considered trusted. Never empty.
    pub pool_ids: Vec<String>,
    /// Override for the provider base URL. When set, the issuer prefix and
    /// key-set URLs are derived from it instead of the regional endpoint.
    /// Useful for private deployments and tests.
    pub endpoint_override: Option<Url>,
    /// Timeout applied to each key-set fetch.
    pub http_timeout: Duration,
}

impl Config {
    /// The issuer prefix every trusted token's `iss` claim must start with.
    ///
    /// The pool id a token belongs to is the remainder of its `iss` value
    /// after this prefix.
    pub fn issuer_prefix(&self) -> String {
        match &self.endpoint_override {
            Some(base) => base.as_str().to_string(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }

    /// The published key-set URL for one user pool.
    pub fn jwks_url(&self, pool_id: &str) -> String {
        format!("{}{}/.well-known/jwks.json", self.issuer_prefix(), pool_id)
    }
}

/// A builder for creating a [`Config`] instance.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    region: Option<String>,
    pool_ids: Vec<String>,
    endpoint_override: Option<Url>,
    http_timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Creates a new `ConfigBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider region. This is a required field.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Adds one trusted user pool id. At least one pool is required.
    pub fn pool_id(mut self, pool_id: impl Into<String>) -> Self {
        self.pool_ids.push(pool_id.into());
        self
    }

    /// Adds a list of trusted user pool ids.
    pub fn pool_ids<I, S>(mut self, pool_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pool_ids.extend(pool_ids.into_iter().map(Into::into));
        self
    }

    /// Sets an explicit provider base URL, bypassing the regional endpoint.
    ///
    /// A trailing slash is appended if missing so that issuer-prefix
    /// derivation stays uniform.
    pub fn endpoint_override(mut self, url: &str) -> Result<Self, TokenError> {
        let mut parsed = Url::parse(url).map_err(|e| TokenError::InvalidUrl(e.to_string()))?;
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        self.endpoint_override = Some(parsed);
        Ok(self)
    }

    /// Sets the timeout for each key-set fetch. Defaults to 10 seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Consumes the builder and returns a [`Config`] object.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingConfiguration`] if the region is absent
    /// or no pool id was provided.
    pub fn build(self) -> Result<Config, TokenError> {
        let region = self
            .region
            .ok_or_else(|| TokenError::MissingConfiguration("region".to_string()))?;
        if self.pool_ids.is_empty() {
            return Err(TokenError::MissingConfiguration("pool_ids".to_string()));
        }
        Ok(Config {
            region,
            pool_ids: self.pool_ids,
            endpoint_override: self.endpoint_override,
            http_timeout: self.http_timeout.unwrap_or(Duration::from_secs(10)),
        })
    }
}
