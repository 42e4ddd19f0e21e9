//! A scripted [`HttpClient`] double that replays canned responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use http::{Request, StatusCode};
use snafu::Snafu;

use crate::http::{HttpClient, HttpResponse};

/// Serves a fixed sequence of responses, one per request, then fails with
/// [`ScriptExhausted`].
pub(crate) struct ScriptedClient {
    responses: Mutex<VecDeque<(StatusCode, &'static str)>>,
}

impl ScriptedClient {
    pub(crate) fn new(responses: impl IntoIterator<Item = (StatusCode, &'static str)>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }

    /// Number of scripted responses not yet served.
    pub(crate) fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("scripted responses exhausted"))]
pub(crate) struct ScriptExhausted;

impl crate::Error for ScriptExhausted {
    fn is_retryable(&self) -> bool {
        false
    }
}

pub(crate) struct ScriptedResponse {
    status: StatusCode,
    body: Bytes,
}

impl HttpResponse for ScriptedResponse {
    type Error = ScriptExhausted;

    fn status(&self) -> StatusCode {
        self.status
    }

    async fn body(self) -> Result<Bytes, Self::Error> {
        Ok(self.body)
    }
}

impl HttpClient for ScriptedClient {
    type Error = ScriptExhausted;
    type Response = ScriptedResponse;

    async fn execute(&self, _request: Request<Bytes>) -> Result<Self::Response, Self::Error> {
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ScriptExhausted)?;
        Ok(ScriptedResponse {
            status,
            body: Bytes::from_static(body.as_bytes()),
        })
    }
}
