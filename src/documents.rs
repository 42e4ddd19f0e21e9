//! Document ingestion and retrieval.
//!
//! Documents are the caller's own serde types; the engine stores arbitrary
//! JSON objects keyed by the index's primary key. All writes are enqueued and
//! answered with a [`TaskSummary`].

use bon::Builder;
use http::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::ResultExt as _;

use crate::{
    http::{
        HttpClient,
        rest::{self, RestResult},
    },
    indexes::Index,
    serde_utils::comma_separated,
    tasks::TaskSummary,
};

/// Pagination and projection for document listing.
#[derive(Debug, Clone, Default, Serialize, Builder)]
pub struct DocumentsQuery {
    /// Number of documents to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Maximum number of documents to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Restrict returned documents to these attributes.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    #[builder(with = |fields: impl IntoIterator<Item = impl Into<String>>| {
        fields.into_iter().map(Into::into).collect()
    })]
    pub fields: Option<Vec<String>>,
}

/// One page of documents.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsResults<T> {
    /// The documents, in the engine's internal order.
    pub results: Vec<T>,
    /// The offset that was applied.
    pub offset: u32,
    /// The page size that was applied.
    pub limit: u32,
    /// Total number of documents in the index.
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryKeyQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FieldsQuery<'a> {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    fields: Option<Vec<&'a str>>,
}

impl Index {
    /// Lists documents (`GET /indexes/{uid}/documents`).
    ///
    /// `T` is the caller's document shape; use `serde_json::Value` for
    /// schemaless access.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn documents<C: HttpClient, T: DeserializeOwned>(
        &self,
        http_client: &C,
        query: &DocumentsQuery,
    ) -> RestResult<DocumentsResults<T>, C> {
        let query = rest::query_string(query).context(rest::BuildSnafu)?;
        self.client
            .request(
                http_client,
                Method::GET,
                &format!("/indexes/{}/documents", self.uid),
                query,
            )
            .await
    }

    /// Fetches one document by its primary key value
    /// (`GET /indexes/{uid}/documents/{id}`).
    ///
    /// `fields` optionally restricts the returned attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist, the request fails,
    /// or the response cannot be parsed.
    pub async fn document<C: HttpClient, T: DeserializeOwned>(
        &self,
        http_client: &C,
        document_id: &str,
        fields: Option<&[&str]>,
    ) -> RestResult<T, C> {
        let query = rest::query_string(&FieldsQuery {
            fields: fields.map(<[&str]>::to_vec),
        })
        .context(rest::BuildSnafu)?;
        self.client
            .request(
                http_client,
                Method::GET,
                &format!("/indexes/{}/documents/{document_id}", self.uid),
                query,
            )
            .await
    }

    /// Adds documents, replacing any existing document with the same primary
    /// key value (`POST /indexes/{uid}/documents`).
    ///
    /// `primary_key` tells the engine which attribute identifies documents;
    /// it is only needed the first time an index receives documents and the
    /// engine cannot infer it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the
    /// response cannot be parsed.
    pub async fn add_or_replace<C: HttpClient, T: Serialize>(
        &self,
        http_client: &C,
        documents: &[T],
        primary_key: Option<&str>,
    ) -> RestResult<TaskSummary, C> {
        let query =
            rest::query_string(&PrimaryKeyQuery { primary_key }).context(rest::BuildSnafu)?;
        self.client
            .request_json(
                http_client,
                Method::POST,
                &format!("/indexes/{}/documents", self.uid),
                query,
                documents,
            )
            .await
    }

    /// Adds documents, merging attributes into any existing document with
    /// the same primary key value (`PUT /indexes/{uid}/documents`).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the
    /// response cannot be parsed.
    pub async fn add_or_update<C: HttpClient, T: Serialize>(
        &self,
        http_client: &C,
        documents: &[T],
        primary_key: Option<&str>,
    ) -> RestResult<TaskSummary, C> {
        let query =
            rest::query_string(&PrimaryKeyQuery { primary_key }).context(rest::BuildSnafu)?;
        self.client
            .request_json(
                http_client,
                Method::PUT,
                &format!("/indexes/{}/documents", self.uid),
                query,
                documents,
            )
            .await
    }

    /// Deletes one document (`DELETE /indexes/{uid}/documents/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn delete_document<C: HttpClient>(
        &self,
        http_client: &C,
        document_id: &str,
    ) -> RestResult<TaskSummary, C> {
        self.client
            .request(
                http_client,
                Method::DELETE,
                &format!("/indexes/{}/documents/{document_id}", self.uid),
                None,
            )
            .await
    }

    /// Deletes a batch of documents by primary key value
    /// (`POST /indexes/{uid}/documents/delete-batch`).
    ///
    /// Ids may be strings or numbers, matching the index's primary key type.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the
    /// response cannot be parsed.
    pub async fn delete_documents<C: HttpClient, I: Serialize>(
        &self,
        http_client: &C,
        document_ids: &[I],
    ) -> RestResult<TaskSummary, C> {
        self.client
            .request_json(
                http_client,
                Method::POST,
                &format!("/indexes/{}/documents/delete-batch", self.uid),
                None,
                document_ids,
            )
            .await
    }

    /// Deletes all documents in the index
    /// (`DELETE /indexes/{uid}/documents`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn delete_all_documents<C: HttpClient>(
        &self,
        http_client: &C,
    ) -> RestResult<TaskSummary, C> {
        self.client
            .request(
                http_client,
                Method::DELETE,
                &format!("/indexes/{}/documents", self.uid),
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_query_comma_joins_fields() {
        let query = DocumentsQuery::builder()
            .offset(10)
            .limit(2)
            .fields(["title", "overview"])
            .build();
        let encoded = rest::query_string(&query).unwrap().unwrap();
        assert_eq!(encoded, "offset=10&limit=2&fields=title%2Coverview");
    }

    #[test]
    fn primary_key_query_is_omitted_when_unset() {
        assert_eq!(
            rest::query_string(&PrimaryKeyQuery { primary_key: None }).unwrap(),
            None
        );
        assert_eq!(
            rest::query_string(&PrimaryKeyQuery {
                primary_key: Some("isbn")
            })
            .unwrap()
            .as_deref(),
            Some("primaryKey=isbn")
        );
    }

    #[test]
    fn documents_results_deserialize_into_caller_types() {
        #[derive(Debug, Deserialize)]
        struct Movie {
            id: u32,
            title: String,
        }

        let source = r#"
            {
              "results": [
                { "id": 25684, "title": "American Ninja 5" },
                { "id": 468219, "title": "Dead in a Week" }
              ],
              "offset": 0,
              "limit": 2,
              "total": 19654
            }
        "#;
        let results = serde_json::from_str::<DocumentsResults<Movie>>(source).unwrap();
        assert_eq!(results.results.len(), 2);
        assert_eq!(results.results[0].id, 25684);
        assert_eq!(results.results[1].title, "Dead in a Week");
        assert_eq!(results.total, 19654);
    }
}
