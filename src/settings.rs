//! Index settings.
//!
//! The engine exposes one settings object per index. Every field here is
//! optional and unset fields are omitted on the wire, so an update built with
//! [`Settings::builder`] only touches what the caller set; the rest keeps its
//! server-side value.

use std::collections::HashMap;

use bon::Builder;
use http::Method;
use serde::{Deserialize, Serialize};

use crate::{
    http::{HttpClient, rest::RestResult},
    indexes::Index,
    tasks::TaskSummary,
};

/// Word-length thresholds at which typos are tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct MinWordSizeForTypos {
    /// Minimum word length to tolerate one typo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_typo: Option<u8>,
    /// Minimum word length to tolerate two typos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_typos: Option<u8>,
}

/// Typo tolerance configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct TypoTolerance {
    /// Master switch for typo tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Word-length thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_word_size_for_typos: Option<MinWordSizeForTypos>,
    /// Query words typo tolerance never applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_on_words: Option<Vec<String>>,
    /// Document attributes typo tolerance never applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_on_attributes: Option<Vec<String>>,
}

/// Pagination limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSetting {
    /// Maximum number of hits reachable through any pagination scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_hits: Option<u64>,
}

/// Faceting limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct FacetingSettings {
    /// Maximum number of distinct values returned per facet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values_per_facet: Option<u64>,
}

/// The full settings object for an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct Settings {
    /// Attributes returned in search hits, `["*"]` by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub displayed_attributes: Option<Vec<String>>,
    /// Attributes searched for query terms, in order of importance.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub searchable_attributes: Option<Vec<String>>,
    /// Attributes usable in `filter` expressions and facets.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub filterable_attributes: Option<Vec<String>>,
    /// Attributes usable in `sort` expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub sortable_attributes: Option<Vec<String>>,
    /// Ranking rules, in order of application.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub ranking_rules: Option<Vec<String>>,
    /// Words ignored at search time.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |values: impl IntoIterator<Item = impl Into<String>>| {
        values.into_iter().map(Into::into).collect()
    })]
    pub stop_words: Option<Vec<String>>,
    /// Synonym groups: word → equivalent words.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<HashMap<String, Vec<String>>>,
    /// Attribute whose value deduplicates hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_attribute: Option<String>,
    /// Typo tolerance configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typo_tolerance: Option<TypoTolerance>,
    /// Pagination limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationSetting>,
    /// Faceting limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faceting: Option<FacetingSettings>,
}

impl Index {
    /// Fetches the index's settings (`GET /indexes/{uid}/settings`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn settings<C: HttpClient>(&self, http_client: &C) -> RestResult<Settings, C> {
        self.client
            .request(
                http_client,
                Method::GET,
                &format!("/indexes/{}/settings", self.uid),
                None,
            )
            .await
    }

    /// Updates the fields set in `settings`, leaving the rest untouched
    /// (`PATCH /indexes/{uid}/settings`).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the
    /// response cannot be parsed.
    pub async fn update_settings<C: HttpClient>(
        &self,
        http_client: &C,
        settings: &Settings,
    ) -> RestResult<TaskSummary, C> {
        self.client
            .request_json(
                http_client,
                Method::PATCH,
                &format!("/indexes/{}/settings", self.uid),
                None,
                settings,
            )
            .await
    }

    /// Resets every setting to the engine's default
    /// (`DELETE /indexes/{uid}/settings`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn reset_settings<C: HttpClient>(
        &self,
        http_client: &C,
    ) -> RestResult<TaskSummary, C> {
        self.client
            .request(
                http_client,
                Method::DELETE,
                &format!("/indexes/{}/settings", self.uid),
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_serializes_only_set_fields() {
        let settings = Settings::builder()
            .filterable_attributes(["genre", "year"])
            .distinct_attribute("product_id")
            .build();
        let body = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "filterableAttributes": ["genre", "year"],
                "distinctAttribute": "product_id"
            })
        );
    }

    #[test]
    fn full_settings_object_deserializes() {
        let source = r#"
            {
              "displayedAttributes": ["*"],
              "searchableAttributes": ["title", "overview"],
              "filterableAttributes": ["genre"],
              "sortableAttributes": ["release_date"],
              "rankingRules": ["words", "typo", "proximity", "attribute", "sort", "exactness"],
              "stopWords": ["the", "a"],
              "synonyms": { "wow": ["world of warcraft"] },
              "distinctAttribute": null,
              "typoTolerance": {
                "enabled": true,
                "minWordSizeForTypos": { "oneTypo": 5, "twoTypos": 9 },
                "disableOnWords": [],
                "disableOnAttributes": []
              },
              "pagination": { "maxTotalHits": 1000 },
              "faceting": { "maxValuesPerFacet": 100 }
            }
        "#;
        let settings = serde_json::from_str::<Settings>(source).unwrap();
        assert_eq!(settings.distinct_attribute, None);
        assert_eq!(
            settings.typo_tolerance.unwrap().min_word_size_for_typos,
            Some(MinWordSizeForTypos {
                one_typo: Some(5),
                two_typos: Some(9)
            })
        );
        assert_eq!(
            settings.pagination,
            Some(PaginationSetting {
                max_total_hits: Some(1000)
            })
        );
    }
}
