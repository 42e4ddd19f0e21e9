//! The top-level client handle.

use std::collections::HashMap;

use bon::Builder;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderValue, Method, Request, header::AUTHORIZATION, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::ResultExt as _;

use crate::{
    ApiKey, BaseUrl, IntoBaseUrl,
    http::{
        HttpClient,
        rest::{
            self, BadHeaderSnafu, BadUriSnafu, BuildRequestError, BuildSnafu, ResponseSnafu,
            RestResult,
        },
    },
    indexes::IndexStats,
};

/// A handle to one search engine instance.
///
/// Holds the instance's base URL and an optional API key; it owns no HTTP
/// implementation, so every operation takes the caller's
/// [`HttpClient`](crate::http::HttpClient). Cloning is cheap and index
/// handles carry their own clone.
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use finna::Client;
///
/// let client = Client::builder()
///     .host("http://localhost:7700")?
///     .api_key("masterKey")
///     .build();
/// let http = reqwest::Client::new();
/// let health = client.health(&http).await?;
/// assert_eq!(health.status, "available");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(state_mod(name = "builder"))]
pub struct Client {
    /// The validated base URL of the instance.
    #[builder(setters(name = "base_url"))]
    host: BaseUrl,

    /// The API key sent as a bearer token, if the instance requires one.
    #[builder(into)]
    api_key: Option<ApiKey>,
}

impl<S: builder::State> ClientBuilder<S> {
    /// Sets the instance host URL.
    ///
    /// Accepts any type that implements [`IntoBaseUrl`], including `&str`,
    /// [`String`], [`Uri`](http::Uri), [`Url`](url::Url), and [`BaseUrl`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed as a valid URI.
    pub fn host<U: IntoBaseUrl>(
        self,
        url: U,
    ) -> Result<ClientBuilder<builder::SetHost<S>>, U::Error>
    where
        S::Host: builder::IsUnset,
    {
        Ok(self.base_url(url.into_base_url()?))
    }
}

impl Client {
    /// Returns the base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &BaseUrl {
        &self.host
    }

    fn assemble(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<Bytes>,
    ) -> Result<Request<Bytes>, BuildRequestError> {
        let uri = self.host.join(path, query).context(BadUriSnafu)?;

        let (mut parts, ()) = Request::new(()).into_parts();
        parts.method = method;
        parts.uri = uri;

        if let Some(api_key) = &self.api_key {
            parts.headers.insert(
                AUTHORIZATION,
                api_key.bearer_header().context(BadHeaderSnafu)?,
            );
        }

        let body = match body {
            Some(body) => {
                parts
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                body
            }
            None => Bytes::new(),
        };

        Ok(Request::from_parts(parts, body))
    }

    /// Executes a body-less request and parses the JSON response.
    pub(crate) async fn request<C: HttpClient, T: DeserializeOwned>(
        &self,
        http_client: &C,
        method: Method,
        path: &str,
        query: Option<String>,
    ) -> RestResult<T, C> {
        let request = self
            .assemble(method, path, query.as_deref(), None)
            .context(BuildSnafu)?;
        let (status, body) = rest::run(http_client, request).await?;
        rest::parse_response(status, &body).context(ResponseSnafu)
    }

    /// Executes a request with a JSON body and parses the JSON response.
    pub(crate) async fn request_json<C, B, T>(
        &self,
        http_client: &C,
        method: Method,
        path: &str,
        query: Option<String>,
        body: &B,
    ) -> RestResult<T, C>
    where
        C: HttpClient,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = rest::json_body(body).context(BuildSnafu)?;
        let request = self
            .assemble(method, path, query.as_deref(), Some(body))
            .context(BuildSnafu)?;
        let (status, body) = rest::run(http_client, request).await?;
        rest::parse_response(status, &body).context(ResponseSnafu)
    }

    /// Executes a body-less request whose success response carries no body.
    pub(crate) async fn request_no_content<C: HttpClient>(
        &self,
        http_client: &C,
        method: Method,
        path: &str,
    ) -> RestResult<(), C> {
        let request = self
            .assemble(method, path, None, None)
            .context(BuildSnafu)?;
        let (status, body) = rest::run(http_client, request).await?;
        rest::parse_empty_response(status, &body).context(ResponseSnafu)
    }

    /// Checks the health of the instance (`GET /health`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn health<C: HttpClient>(&self, http_client: &C) -> RestResult<Health, C> {
        self.request(http_client, Method::GET, "/health", None).await
    }

    /// Returns true if the instance answers `/health` with an `available`
    /// status, false on any failure.
    pub async fn is_healthy<C: HttpClient>(&self, http_client: &C) -> bool {
        match self.health(http_client).await {
            Ok(health) => health.status == "available",
            Err(_) => false,
        }
    }

    /// Fetches the engine's version information (`GET /version`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn version<C: HttpClient>(&self, http_client: &C) -> RestResult<Version, C> {
        self.request(http_client, Method::GET, "/version", None)
            .await
    }

    /// Fetches instance-wide statistics (`GET /stats`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn stats<C: HttpClient>(&self, http_client: &C) -> RestResult<ClientStats, C> {
        self.request(http_client, Method::GET, "/stats", None).await
    }
}

/// Response from the health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    /// The instance's self-reported status, `available` when healthy.
    pub status: String,
}

/// Response from the version endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Commit the running binary was built from.
    pub commit_sha: String,
    /// Date of that commit, as the engine reports it.
    pub commit_date: String,
    /// The engine's package version.
    pub pkg_version: String,
}

/// Instance-wide statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    /// Size of the engine's database on disk, in bytes.
    pub database_size: u64,
    /// When an index was last updated, if ever.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Per-index statistics, keyed by index uid.
    pub indexes: HashMap<String, IndexStats>,
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::testing::ScriptedClient;

    fn client() -> Client {
        Client::builder()
            .host("http://localhost:7700")
            .unwrap()
            .api_key("masterKey")
            .build()
    }

    #[test]
    fn builder_accepts_string_hosts() {
        let client = client();
        assert_eq!(
            client.base_url().as_uri().to_string(),
            "http://localhost:7700/"
        );
        assert_eq!(
            client.api_key.as_ref().unwrap().expose_secret(),
            "masterKey"
        );
    }

    #[test]
    fn builder_rejects_invalid_hosts() {
        assert!(Client::builder().host("not a url").is_err());
    }

    #[test]
    fn assembled_request_carries_bearer_token() {
        let request = client()
            .assemble(Method::GET, "/health", None, None)
            .unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer masterKey"
        );
        assert!(request.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn json_bodies_set_content_type() {
        let request = client()
            .assemble(
                Method::POST,
                "/indexes",
                None,
                Some(Bytes::from_static(b"{}")),
            )
            .unwrap();
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn requests_without_key_have_no_auth_header() {
        let client = Client::builder()
            .host("http://localhost:7700")
            .unwrap()
            .build();
        let request = client.assemble(Method::GET, "/health", None, None).unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn is_healthy_answers_true_when_available() {
        let http = ScriptedClient::new([(StatusCode::OK, r#"{"status": "available"}"#)]);
        assert!(client().is_healthy(&http).await);
    }

    #[tokio::test]
    async fn is_healthy_swallows_failures() {
        let http = ScriptedClient::new([(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"message": "Instance is unavailable.", "code": "instance_unavailable",
                "type": "system", "link": null}"#,
        )]);
        assert!(!client().is_healthy(&http).await);

        // Transport failures answer false too.
        let http = ScriptedClient::new(std::iter::empty::<(StatusCode, &'static str)>());
        assert!(!client().is_healthy(&http).await);
    }

    #[test]
    fn stats_deserialize() {
        let source = r#"
            {
              "databaseSize": 447819776,
              "lastUpdate": "2024-07-04T14:25:52.452968Z",
              "indexes": {
                "movies": {
                  "numberOfDocuments": 19654,
                  "isIndexing": false,
                  "fieldDistribution": { "title": 19654, "overview": 19654 }
                }
              }
            }
        "#;
        let stats = serde_json::from_str::<ClientStats>(source).unwrap();
        assert_eq!(stats.database_size, 447_819_776);
        assert_eq!(stats.indexes["movies"].number_of_documents, 19654);
    }

    #[test]
    fn version_deserializes() {
        let source = r#"
            {
              "commitSha": "b46889b5f0f2f8b91438a08a358ba8f05fc09fc1",
              "commitDate": "2024-07-09T10:00:00Z",
              "pkgVersion": "1.9.0"
            }
        "#;
        let version = serde_json::from_str::<Version>(source).unwrap();
        assert_eq!(version.pkg_version, "1.9.0");
    }
}
