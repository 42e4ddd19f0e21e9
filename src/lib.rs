//! Implements a typed async client for a document search engine's REST API.
//!
//! The crate binds the engine's HTTP surface: index CRUD, document ingestion
//! and retrieval, search, settings, task polling, and API key management.
//! Mutating operations are asynchronous on the server side; they answer with a
//! [`TaskSummary`](tasks::TaskSummary) that can be awaited with a
//! fixed-interval poller.
//!
//! No HTTP implementation is bundled. Every operation is generic over
//! [`HttpClient`](http::HttpClient); enable the `http-client-reqwest-0_12`
//! feature to use a `reqwest::Client` directly.

#![forbid(unsafe_code)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod api_key;
mod base_url;
mod client;
pub mod documents;
mod error;
pub mod http;
pub mod indexes;
pub mod keys;
pub mod platform;
pub mod prelude;
pub mod search;
mod serde_utils;
pub mod settings;
pub mod tasks;
#[cfg(test)]
mod testing;

pub use api_key::ApiKey;
pub use base_url::{BaseUrl, IntoBaseUrl};
pub use client::{Client, ClientBuilder, ClientStats, Health, Version};
pub use error::{BoxedError, Error};

/// Re-export of parts of the `secrecy` crate.
pub mod secrecy {
    pub use ::secrecy::{ExposeSecret, SecretBox, SecretString};
}

pub use bytes::Bytes;
