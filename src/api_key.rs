//! The API key used to authenticate against the engine.

use http::{HeaderValue, header::InvalidHeaderValue};
use secrecy::{ExposeSecret, SecretString, zeroize::Zeroize};
use serde::Serialize;

/// An API key for a search engine instance.
///
/// Sent as `Authorization: Bearer <key>` on every request. The key is held in
/// a [`SecretString`] so it is redacted from `Debug` output and zeroized on
/// drop.
#[derive(Debug, Clone)]
pub struct ApiKey(pub SecretString);

impl Serialize for ApiKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.expose_secret())
    }
}

impl Zeroize for ApiKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<SecretString> for ApiKey {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}

impl ExposeSecret<str> for ApiKey {
    fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl ApiKey {
    /// Builds the `Authorization` header value for this key.
    ///
    /// The header is marked sensitive so HTTP implementations that log
    /// requests will not print it.
    pub(crate) fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.expose_secret()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::from("very-secret-master-key");
        assert!(!format!("{key:?}").contains("very-secret-master-key"));
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let key = ApiKey::from("masterKey");
        let header = key.bearer_header().unwrap();
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Bearer masterKey");
    }
}
