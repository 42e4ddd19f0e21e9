//! API key management.
//!
//! Keys scope access to actions and indexes. Unlike the task-producing
//! endpoints, key operations are synchronous: the engine answers with the key
//! itself (or `204 No Content` on deletion).

use bon::Builder;
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use snafu::ResultExt as _;
use uuid::Uuid;

use crate::{
    ApiKey, Client,
    http::{
        HttpClient,
        rest::{self, RestResult},
    },
};

/// An API key on the instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    /// The key's stable identifier.
    pub uid: Uuid,
    /// The secret value sent as the bearer token.
    pub key: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Actions the key may perform, e.g. `search` or `documents.add`;
    /// `*` for all.
    pub actions: Vec<String>,
    /// Indexes the key may act on; `*` for all.
    pub indexes: Vec<String>,
    /// When the key stops working; `None` means it never expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the key was created.
    pub created_at: DateTime<Utc>,
    /// When the key was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Key {
    /// Returns this key's secret value as an [`ApiKey`] for building a
    /// scoped [`Client`].
    #[must_use]
    pub fn as_api_key(&self) -> ApiKey {
        self.key.as_str().into()
    }
}

/// Payload for creating a key (`POST /keys`).
///
/// `expires_at` is always sent, as the engine requires the field; `None`
/// serializes to `null`, meaning the key never expires.
#[derive(Debug, Clone, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct KeyDescription {
    /// A caller-chosen uid; the engine generates one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Actions the key may perform.
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub actions: Vec<String>,
    /// Indexes the key may act on.
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub indexes: Vec<String>,
    /// When the key stops working; `None` for a non-expiring key.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Payload for updating a key (`PATCH /keys/{uid}`).
///
/// The engine only allows changing `name` and `description`; permissions are
/// immutable, create a new key instead.
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[builder(on(String, into))]
pub struct KeyPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Pagination for key listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Builder)]
pub struct KeysQuery {
    /// Number of keys to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Maximum number of keys to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of keys.
#[derive(Debug, Clone, Deserialize)]
pub struct KeysResults {
    /// The keys, newest first.
    pub results: Vec<Key>,
    /// The offset that was applied.
    pub offset: u32,
    /// The page size that was applied.
    pub limit: u32,
    /// Total number of keys on the instance.
    pub total: u32,
}

impl Client {
    /// Lists API keys (`GET /keys`). Requires the master key or a key with
    /// the `keys.get` action.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn keys<C: HttpClient>(
        &self,
        http_client: &C,
        query: &KeysQuery,
    ) -> RestResult<KeysResults, C> {
        let query = rest::query_string(query).context(rest::BuildSnafu)?;
        self.request(http_client, Method::GET, "/keys", query).await
    }

    /// Fetches one key by uid or by its secret value (`GET /keys/{uid}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist, the request fails, or the
    /// response cannot be parsed.
    pub async fn get_key<C: HttpClient>(
        &self,
        http_client: &C,
        uid_or_key: &str,
    ) -> RestResult<Key, C> {
        self.request(http_client, Method::GET, &format!("/keys/{uid_or_key}"), None)
            .await
    }

    /// Creates a key (`POST /keys`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the description is rejected,
    /// or the response cannot be parsed.
    pub async fn create_key<C: HttpClient>(
        &self,
        http_client: &C,
        description: &KeyDescription,
    ) -> RestResult<Key, C> {
        self.request_json(http_client, Method::POST, "/keys", None, description)
            .await
    }

    /// Updates a key's name or description (`PATCH /keys/{uid}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn update_key<C: HttpClient>(
        &self,
        http_client: &C,
        uid: Uuid,
        patch: &KeyPatch,
    ) -> RestResult<Key, C> {
        self.request_json(http_client, Method::PATCH, &format!("/keys/{uid}"), None, patch)
            .await
    }

    /// Deletes a key (`DELETE /keys/{uid}`). The engine answers
    /// `204 No Content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the engine rejects the
    /// deletion.
    pub async fn delete_key<C: HttpClient>(
        &self,
        http_client: &C,
        uid: Uuid,
    ) -> RestResult<(), C> {
        self.request_no_content(http_client, Method::DELETE, &format!("/keys/{uid}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    #[test]
    fn key_deserializes() {
        let source = r#"
            {
              "name": "Search-only key",
              "description": null,
              "key": "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4",
              "uid": "6062abda-a5aa-4414-ac91-ecd7944c0f8d",
              "actions": ["search"],
              "indexes": ["movies"],
              "expiresAt": null,
              "createdAt": "2024-01-15T09:37:51.522776Z",
              "updatedAt": "2024-01-15T09:37:51.522776Z"
            }
        "#;
        let key = serde_json::from_str::<Key>(source).unwrap();
        assert_eq!(key.name.as_deref(), Some("Search-only key"));
        assert_eq!(key.actions, ["search"]);
        assert_eq!(key.expires_at, None);
        assert_eq!(
            key.as_api_key().expose_secret(),
            "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4"
        );
    }

    #[test]
    fn description_always_sends_expires_at() {
        let description = KeyDescription::builder()
            .name("ci")
            .actions(["documents.add"])
            .indexes(["movies"])
            .build();
        let body = serde_json::to_value(&description).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "ci",
                "actions": ["documents.add"],
                "indexes": ["movies"],
                "expiresAt": null
            })
        );
    }

    #[test]
    fn patch_only_carries_set_fields() {
        let patch = KeyPatch::builder().description("rotated").build();
        let body = serde_json::to_string(&patch).unwrap();
        assert_eq!(body, r#"{"description":"rotated"}"#);
    }
}
