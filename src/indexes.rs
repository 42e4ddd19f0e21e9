//! Index handles, index metadata, and index CRUD.

use std::collections::HashMap;

use bon::Builder;
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use snafu::ResultExt as _;

use crate::{
    Client,
    http::{
        HttpClient,
        rest::{self, RestResult},
    },
    tasks::TaskSummary,
};

/// Index metadata as the engine returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// The index's unique identifier.
    pub uid: String,
    /// The attribute used as the document identifier; `None` until the
    /// engine has inferred or been told one.
    #[serde(default)]
    pub primary_key: Option<String>,
    /// When the index was created.
    pub created_at: DateTime<Utc>,
    /// When the index was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A handle to one index on the instance.
///
/// Obtained from [`Client::index`] (no round trip, metadata unset) or
/// [`Client::get_index`] (fetched metadata). The handle owns a clone of the
/// [`Client`], so document, search, and settings operations need no extra
/// plumbing.
#[derive(Debug, Clone)]
pub struct Index {
    pub(crate) client: Client,
    /// The index's unique identifier.
    pub uid: String,
    /// The attribute used as the document identifier, if known.
    pub primary_key: Option<String>,
    /// When the index was created, if fetched.
    pub created_at: Option<DateTime<Utc>>,
    /// When the index was last updated, if fetched.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Index {
    pub(crate) fn new(client: Client, uid: impl Into<String>) -> Self {
        Self {
            client,
            uid: uid.into(),
            primary_key: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn from_metadata(client: Client, metadata: IndexMetadata) -> Self {
        Self {
            client,
            uid: metadata.uid,
            primary_key: metadata.primary_key,
            created_at: Some(metadata.created_at),
            updated_at: Some(metadata.updated_at),
        }
    }

    /// Fetches this index's statistics (`GET /indexes/{uid}/stats`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn stats<C: HttpClient>(&self, http_client: &C) -> RestResult<IndexStats, C> {
        self.client
            .request(
                http_client,
                Method::GET,
                &format!("/indexes/{}/stats", self.uid),
                None,
            )
            .await
    }
}

/// Statistics for one index.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of documents in the index.
    pub number_of_documents: u64,
    /// True while the engine is processing tasks for this index.
    pub is_indexing: bool,
    /// For each document attribute, how many documents carry it.
    pub field_distribution: HashMap<String, u64>,
}

/// Pagination for index listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Builder)]
pub struct IndexesQuery {
    /// Number of indexes to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Maximum number of indexes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of indexes.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexesResults {
    /// The index metadata records.
    pub results: Vec<IndexMetadata>,
    /// The offset that was applied.
    pub offset: u32,
    /// The page size that was applied.
    pub limit: u32,
    /// Total number of indexes on the instance.
    pub total: u32,
}

/// One swap operation: the two index uids exchange their contents and
/// settings atomically.
#[derive(Debug, Clone, Serialize)]
pub struct SwapIndexes {
    /// The pair of index uids to swap.
    pub indexes: (String, String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIndexBody<'a> {
    uid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIndexBody<'a> {
    primary_key: Option<&'a str>,
}

impl Client {
    /// Returns a handle to an index without a round trip.
    ///
    /// The handle's metadata fields stay unset; use [`Client::get_index`] to
    /// fetch them.
    #[must_use]
    pub fn index(&self, uid: impl Into<String>) -> Index {
        Index::new(self.clone(), uid)
    }

    /// Lists indexes (`GET /indexes`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn list_indexes<C: HttpClient>(
        &self,
        http_client: &C,
        query: &IndexesQuery,
    ) -> RestResult<IndexesResults, C> {
        let query = rest::query_string(query).context(rest::BuildSnafu)?;
        self.request(http_client, Method::GET, "/indexes", query)
            .await
    }

    /// Fetches one index and returns a handle with its metadata
    /// (`GET /indexes/{uid}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the index does not exist, the request fails, or
    /// the response cannot be parsed.
    pub async fn get_index<C: HttpClient>(
        &self,
        http_client: &C,
        uid: &str,
    ) -> RestResult<Index, C> {
        let metadata: IndexMetadata = self
            .request(http_client, Method::GET, &format!("/indexes/{uid}"), None)
            .await?;
        Ok(Index::from_metadata(self.clone(), metadata))
    }

    /// Creates an index (`POST /indexes`).
    ///
    /// The engine enqueues the creation; await the returned summary to learn
    /// whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn create_index<C: HttpClient>(
        &self,
        http_client: &C,
        uid: &str,
        primary_key: Option<&str>,
    ) -> RestResult<TaskSummary, C> {
        self.request_json(
            http_client,
            Method::POST,
            "/indexes",
            None,
            &CreateIndexBody { uid, primary_key },
        )
        .await
    }

    /// Changes an index's primary key (`PATCH /indexes/{uid}`).
    ///
    /// Passing `None` clears the primary key; the engine only accepts this
    /// while the index is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn update_index<C: HttpClient>(
        &self,
        http_client: &C,
        uid: &str,
        primary_key: Option<&str>,
    ) -> RestResult<TaskSummary, C> {
        self.request_json(
            http_client,
            Method::PATCH,
            &format!("/indexes/{uid}"),
            None,
            &UpdateIndexBody { primary_key },
        )
        .await
    }

    /// Deletes an index (`DELETE /indexes/{uid}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn delete_index<C: HttpClient>(
        &self,
        http_client: &C,
        uid: &str,
    ) -> RestResult<TaskSummary, C> {
        self.request(http_client, Method::DELETE, &format!("/indexes/{uid}"), None)
            .await
    }

    /// Swaps the contents of index pairs atomically (`POST /swap-indexes`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn swap_indexes<C: HttpClient>(
        &self,
        http_client: &C,
        swaps: &[SwapIndexes],
    ) -> RestResult<TaskSummary, C> {
        self.request_json(http_client, Method::POST, "/swap-indexes", None, swaps)
            .await
    }
}
