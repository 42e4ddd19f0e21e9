//! HTTP client and response abstractions.
//!
//! The crate does not bundle an HTTP implementation. Callers provide an
//! [`HttpClient`] (e.g. backed by `reqwest`, `hyper`, or a WASM `fetch`
//! wrapper) and every engine operation executes through it. The
//! `http-client-reqwest-0_12` feature implements the trait for
//! `reqwest::Client`.

#[cfg(all(not(target_arch = "wasm32"), feature = "http-client-reqwest-0_12"))]
mod reqwest_0_12;
pub mod rest;

use bytes::Bytes;
use http::{Request, StatusCode};

use crate::platform::{MaybeSend, MaybeSendSync};

/// Defines the common interface for HTTP requests.
pub trait HttpClient: MaybeSendSync {
    /// The error type returned by the client for a failed request.
    type Error: crate::Error;

    /// The associated response type returned by this HTTP client.
    type Response: HttpResponse;

    /// Executes an HTTP request and returns an owned response.
    ///
    /// The request carries its body as [`Bytes`]; requests without a body use
    /// [`Bytes::new`].
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + MaybeSend;
}

/// Defines the common interface for HTTP responses.
pub trait HttpResponse: MaybeSendSync {
    /// The error type when getting the response body.
    type Error: crate::Error;

    /// Returns the HTTP status code of the response.
    fn status(&self) -> StatusCode;

    /// Consumes the response and asynchronously returns its body as [`Bytes`].
    fn body(self) -> impl Future<Output = Result<Bytes, Self::Error>> + MaybeSend;
}
