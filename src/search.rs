//! Search queries and results.
//!
//! A search is a `POST` to `/indexes/{uid}/search` with the query as a JSON
//! body. The engine does the ranking, typo tolerance, and highlighting; this
//! module only mirrors its request and response shapes.

use std::collections::HashMap;

use bon::Builder;
use http::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    http::{HttpClient, rest::RestResult},
    indexes::Index,
};

/// How the engine matches documents against the query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchingStrategy {
    /// Drop query terms from the end until matches are found (the engine's
    /// default).
    Last,
    /// Only return documents matching every query term.
    All,
}

/// A search request.
///
/// All fields are optional; an empty query is a browse over the whole index.
/// Field names serialize to the engine's camelCase wire names.
///
/// ```
/// use finna::search::SearchQuery;
///
/// let query = SearchQuery::builder()
///     .q("shifu")
///     .filter(["genre = 'wuxia'"])
///     .attributes_to_highlight(["title"])
///     .limit(5)
///     .build();
/// ```
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct SearchQuery {
    /// The query terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Number of hits to skip (offset/limit pagination).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Maximum number of hits to return (offset/limit pagination).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Hits per page (exhaustive pagination; overrides offset/limit).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
    /// The page to fetch (exhaustive pagination).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Filter expressions over filterable attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub filter: Option<Vec<String>>,
    /// Facets to compute distributions for.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub facets: Option<Vec<String>>,
    /// Restrict returned documents to these attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub attributes_to_retrieve: Option<Vec<String>>,
    /// Attributes whose values are cropped around the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub attributes_to_crop: Option<Vec<String>>,
    /// Crop window size, in words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_length: Option<u32>,
    /// String marking cropped text, `…` by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_marker: Option<String>,
    /// Attributes whose matches are wrapped in highlight tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub attributes_to_highlight: Option<Vec<String>>,
    /// Tag inserted before a highlighted match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_pre_tag: Option<String>,
    /// Tag inserted after a highlighted match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_post_tag: Option<String>,
    /// Sort expressions over sortable attributes, e.g. `price:asc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub sort: Option<Vec<String>>,
    /// How query terms are matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_strategy: Option<MatchingStrategy>,
    /// Include the position of each match in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_matches_position: Option<bool>,
}

/// A page of search results.
///
/// `T` is the caller's document shape. Pagination fields depend on the
/// request: offset/limit requests fill `offset`, `limit`, and
/// `estimated_total_hits`; page-based requests fill `hits_per_page`, `page`,
/// `total_hits`, and `total_pages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<T> {
    /// The matching documents, best first.
    pub hits: Vec<T>,
    /// The query terms, echoed back.
    pub query: String,
    /// Server-side processing time, in milliseconds.
    pub processing_time_ms: u64,
    /// The offset that was applied.
    #[serde(default)]
    pub offset: Option<u32>,
    /// The limit that was applied.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Approximate number of matches (offset/limit pagination).
    #[serde(default)]
    pub estimated_total_hits: Option<u64>,
    /// The page size that was applied (page-based pagination).
    #[serde(default)]
    pub hits_per_page: Option<u32>,
    /// The page that was returned (page-based pagination).
    #[serde(default)]
    pub page: Option<u32>,
    /// Exhaustive number of matches (page-based pagination).
    #[serde(default)]
    pub total_hits: Option<u64>,
    /// Exhaustive number of pages (page-based pagination).
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Requested facet distributions: facet → value → count.
    #[serde(default)]
    pub facet_distribution: Option<HashMap<String, HashMap<String, u64>>>,
}

impl Index {
    /// Searches the index (`POST /indexes/{uid}/search`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the filter or query is
    /// rejected by the engine, or the response cannot be parsed.
    pub async fn search<C: HttpClient, T: DeserializeOwned>(
        &self,
        http_client: &C,
        query: &SearchQuery,
    ) -> RestResult<SearchResults<T>, C> {
        self.client
            .request_json(
                http_client,
                Method::POST,
                &format!("/indexes/{}/search", self.uid),
                None,
                query,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_serializes_camel_case_and_omits_unset_fields() {
        let query = SearchQuery::builder()
            .q("american ninja")
            .limit(2)
            .filter(["genre = action"])
            .matching_strategy(MatchingStrategy::All)
            .build();
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "q": "american ninja",
                "limit": 2,
                "filter": ["genre = action"],
                "matchingStrategy": "all"
            })
        );
    }

    #[test]
    fn empty_query_serializes_to_an_empty_object() {
        let body = serde_json::to_string(&SearchQuery::default()).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn results_deserialize_with_offset_pagination() {
        #[derive(Debug, Deserialize)]
        struct Movie {
            title: String,
        }

        let source = r#"
            {
              "hits": [
                { "id": 2770, "title": "American Pie 2" },
                { "id": 190859, "title": "American Sniper" }
              ],
              "query": "american",
              "processingTimeMs": 14,
              "offset": 0,
              "limit": 2,
              "estimatedTotalHits": 976
            }
        "#;
        let results = serde_json::from_str::<SearchResults<Movie>>(source).unwrap();
        assert_eq!(results.hits.len(), 2);
        assert_eq!(results.hits[1].title, "American Sniper");
        assert_eq!(results.estimated_total_hits, Some(976));
        assert_eq!(results.total_pages, None);
    }

    #[test]
    fn results_deserialize_with_page_pagination_and_facets() {
        let source = r#"
            {
              "hits": [{ "id": 1 }],
              "query": "",
              "processingTimeMs": 3,
              "hitsPerPage": 1,
              "page": 1,
              "totalHits": 42,
              "totalPages": 42,
              "facetDistribution": {
                "genre": { "action": 30, "drama": 12 }
              }
            }
        "#;
        let results = serde_json::from_str::<SearchResults<serde_json::Value>>(source).unwrap();
        assert_eq!(results.total_pages, Some(42));
        assert_eq!(results.facet_distribution.unwrap()["genre"]["action"], 30);
    }
}
