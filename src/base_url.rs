//! A validated base URL for a search engine instance.
//!
//! [`BaseUrl`] is a newtype over [`Uri`] that guarantees the host URL has been
//! validated once, at client construction. Endpoint URIs are derived from it
//! by appending a path and an optional query string; a path prefix on the
//! host (e.g. an instance behind a reverse proxy) is preserved.

use std::convert::Infallible;

use http::{Uri, uri::InvalidUri};
use url::Url;

/// A validated base URL of a search engine instance.
///
/// Constructed from common string and URL types via [`IntoBaseUrl`]. Once
/// constructed it can be freely cloned and shared between index handles
/// without re-validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Uri);

impl BaseUrl {
    /// Returns the inner [`Uri`].
    #[must_use]
    pub fn as_uri(&self) -> &Uri {
        &self.0
    }

    /// Builds the URI for an endpoint under this base URL.
    ///
    /// `path` must start with `/`. `query` is appended verbatim; callers are
    /// expected to have form-encoded it already.
    pub(crate) fn join(&self, path: &str, query: Option<&str>) -> Result<Uri, http::Error> {
        let base_path = self.0.path();
        let base_path = base_path.strip_suffix('/').unwrap_or(base_path);
        let path_and_query = match query {
            Some(query) if !query.is_empty() => format!("{base_path}{path}?{query}"),
            _ => format!("{base_path}{path}"),
        };
        let mut parts = self.0.clone().into_parts();
        parts.path_and_query = Some(path_and_query.try_into()?);
        Ok(Uri::from_parts(parts)?)
    }
}

/// Conversion trait for types that can be turned into a [`BaseUrl`].
pub trait IntoBaseUrl {
    /// The error type returned if the conversion fails.
    type Error;

    /// Attempts to convert this value into a [`BaseUrl`].
    fn into_base_url(self) -> Result<BaseUrl, Self::Error>;
}

impl IntoBaseUrl for BaseUrl {
    type Error = Infallible;

    fn into_base_url(self) -> Result<BaseUrl, Self::Error> {
        Ok(self)
    }
}

impl IntoBaseUrl for Uri {
    type Error = Infallible;

    fn into_base_url(self) -> Result<BaseUrl, Self::Error> {
        Ok(BaseUrl(self))
    }
}

impl IntoBaseUrl for Url {
    type Error = InvalidUri;

    fn into_base_url(self) -> Result<BaseUrl, Self::Error> {
        self.as_str().parse::<Uri>().map(BaseUrl)
    }
}

impl IntoBaseUrl for &str {
    type Error = InvalidUri;

    fn into_base_url(self) -> Result<BaseUrl, Self::Error> {
        self.parse::<Uri>().map(BaseUrl)
    }
}

impl IntoBaseUrl for String {
    type Error = InvalidUri;

    fn into_base_url(self) -> Result<BaseUrl, Self::Error> {
        self.parse::<Uri>().map(BaseUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_path_onto_host() {
        let base = "http://localhost:7700".into_base_url().unwrap();
        let uri = base.join("/indexes/movies/search", None).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:7700/indexes/movies/search");
    }

    #[test]
    fn joins_query_string() {
        let base = "http://localhost:7700".into_base_url().unwrap();
        let uri = base.join("/tasks", Some("limit=10&from=2")).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:7700/tasks?limit=10&from=2");
    }

    #[test]
    fn empty_query_is_dropped() {
        let base = "http://localhost:7700".into_base_url().unwrap();
        let uri = base.join("/indexes", Some("")).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:7700/indexes");
    }

    #[test]
    fn trailing_slash_on_host_is_ignored() {
        let base = "https://search.example.com/".into_base_url().unwrap();
        let uri = base.join("/health", None).unwrap();
        assert_eq!(uri.to_string(), "https://search.example.com/health");
    }

    #[test]
    fn host_path_prefix_is_preserved() {
        let base = "https://example.com/engine/".into_base_url().unwrap();
        let uri = base.join("/indexes/books", None).unwrap();
        assert_eq!(uri.to_string(), "https://example.com/engine/indexes/books");
    }

    #[test]
    fn accepts_url_crate_urls() {
        let url = Url::parse("http://127.0.0.1:7700").unwrap();
        let base = url.into_base_url().unwrap();
        assert_eq!(base.as_uri().port_u16(), Some(7700));
    }
}
