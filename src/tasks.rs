//! Asynchronous task tracking and the completion poller.
//!
//! Every mutating operation (index CRUD, document ingestion, settings
//! changes, task cancelation) is enqueued by the engine and answered with a
//! [`TaskSummary`]. The task then moves `enqueued` → `processing` → one of
//! the terminal states. [`Client::wait_for_task`] polls the task endpoint at
//! a fixed interval until a terminal state is reached or a deadline passes;
//! there is no backoff, the server contract is a plain three-state poll.

use std::fmt;

use bon::Builder;
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt as _, Snafu};

use crate::{
    Client,
    http::{
        HttpClient, HttpResponse,
        rest::{self, ApiErrorBody, RestError, RestResult},
    },
    platform::{Duration, Instant, sleep},
    serde_utils::comma_separated,
};

/// Where a task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Accepted by the engine, waiting to be processed.
    Enqueued,
    /// Currently being processed.
    Processing,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error; see [`Task::error`].
    Failed,
    /// Canceled by a task cancelation request.
    Canceled,
}

impl TaskStatus {
    /// Returns true once the engine will never change this status again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        })
    }
}

/// The kind of operation a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    /// An index was created.
    IndexCreation,
    /// An index's primary key was changed.
    IndexUpdate,
    /// An index was deleted.
    IndexDeletion,
    /// Two or more indexes were swapped.
    IndexSwap,
    /// Documents were added or replaced/updated.
    DocumentAdditionOrUpdate,
    /// Documents were deleted.
    DocumentDeletion,
    /// Index settings were changed or reset.
    SettingsUpdate,
    /// Tasks were canceled.
    TaskCancelation,
    /// Task records were deleted.
    TaskDeletion,
    /// A dump was created.
    DumpCreation,
    /// A snapshot was created.
    SnapshotCreation,
    /// A kind this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IndexCreation => "indexCreation",
            Self::IndexUpdate => "indexUpdate",
            Self::IndexDeletion => "indexDeletion",
            Self::IndexSwap => "indexSwap",
            Self::DocumentAdditionOrUpdate => "documentAdditionOrUpdate",
            Self::DocumentDeletion => "documentDeletion",
            Self::SettingsUpdate => "settingsUpdate",
            Self::TaskCancelation => "taskCancelation",
            Self::TaskDeletion => "taskDeletion",
            Self::DumpCreation => "dumpCreation",
            Self::SnapshotCreation => "snapshotCreation",
            Self::Unknown => "unknown",
        })
    }
}

/// A full task record (`GET /tasks/{uid}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// The task's unique, monotonically increasing identifier.
    pub uid: u32,
    /// The index the task acts on; absent for instance-level tasks.
    #[serde(default)]
    pub index_uid: Option<String>,
    /// Where the task is in its lifecycle.
    pub status: TaskStatus,
    /// The kind of operation.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// The uid of the `taskCancelation` task that canceled this one.
    #[serde(default)]
    pub canceled_by: Option<u32>,
    /// Kind-specific details, mirrored as free-form JSON.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// The error that failed the task, if it failed.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    /// Processing duration as the engine reports it (ISO 8601).
    #[serde(default)]
    pub duration: Option<String>,
    /// When the engine accepted the task.
    pub enqueued_at: DateTime<Utc>,
    /// When processing began.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When processing finished.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// The `202 Accepted` body returned by every mutating operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// The uid of the enqueued task.
    pub task_uid: u32,
    /// The index the task acts on; absent for instance-level tasks.
    #[serde(default)]
    pub index_uid: Option<String>,
    /// The task's status at enqueue time (always `enqueued`).
    pub status: TaskStatus,
    /// The kind of operation.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// When the engine accepted the task.
    pub enqueued_at: DateTime<Utc>,
}

impl TaskSummary {
    /// Polls the task until it reaches a terminal status.
    ///
    /// See [`Client::wait_for_task`].
    ///
    /// # Errors
    ///
    /// Returns an error if polling fails or the deadline passes first.
    pub async fn wait_for_completion<C: HttpClient>(
        &self,
        client: &Client,
        http_client: &C,
        options: &WaitOptions,
    ) -> Result<Task, WaitError<C::Error, <C::Response as HttpResponse>::Error>> {
        client
            .wait_for_task(http_client, self.task_uid, options)
            .await
    }
}

/// Filters for listing, canceling, or deleting tasks.
///
/// List-valued filters are comma-joined into a single query parameter, which
/// is what the engine expects.
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    /// Maximum number of tasks to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return tasks with a uid at or below this value, newest first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
    /// Restrict to these task uids.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    pub uids: Option<Vec<u32>>,
    /// Restrict to these statuses.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    pub statuses: Option<Vec<TaskStatus>>,
    /// Restrict to these task kinds.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    pub types: Option<Vec<TaskKind>>,
    /// Restrict to tasks acting on these indexes.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    #[builder(with = |uids: impl IntoIterator<Item = impl Into<String>>| {
        uids.into_iter().map(Into::into).collect()
    })]
    pub index_uids: Option<Vec<String>>,
}

/// One page of task records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksResults {
    /// The tasks, newest first.
    pub results: Vec<Task>,
    /// The page size that was applied.
    pub limit: u32,
    /// The `from` value that was applied.
    #[serde(default)]
    pub from: Option<u32>,
    /// Pass this as `from` to fetch the next page; `None` on the last page.
    #[serde(default)]
    pub next: Option<u32>,
    /// Total number of tasks matching the filter.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Pacing for the task completion poller.
#[derive(Debug, Clone, Copy, Builder)]
pub struct WaitOptions {
    /// Time to wait between polls.
    #[builder(default = Duration::from_millis(50))]
    pub interval: Duration,
    /// Give up once this much time has passed.
    ///
    /// The cutoff is predictive: when the time already elapsed plus one
    /// [`interval`](Self::interval) reaches this value, the poller returns
    /// [`WaitError::Timeout`] instead of sleeping into a poll that could not
    /// land before the deadline. The last poll therefore fires at or before
    /// `timeout - interval`.
    #[builder(default = Duration::from_secs(5))]
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Errors that may occur while waiting for a task to complete.
#[derive(Debug, Snafu)]
pub enum WaitError<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> {
    /// The task did not reach a terminal status before the deadline.
    #[snafu(display("Task {task_uid} did not reach a terminal status within {timeout:?}"))]
    Timeout {
        /// The task being waited on.
        task_uid: u32,
        /// The deadline that passed.
        timeout: Duration,
    },
    /// Fetching the task failed.
    Poll {
        /// The underlying error.
        source: RestError<HttpReqErr, HttpRespErr>,
    },
}

impl<HttpReqErr: crate::Error, HttpRespErr: crate::Error> crate::Error
    for WaitError<HttpReqErr, HttpRespErr>
{
    fn is_retryable(&self) -> bool {
        match self {
            // The task may still complete; waiting again can succeed.
            Self::Timeout { .. } => true,
            Self::Poll { source } => source.is_retryable(),
        }
    }
}

impl Client {
    /// Lists tasks matching `query` (`GET /tasks`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn tasks<C: HttpClient>(
        &self,
        http_client: &C,
        query: &TasksQuery,
    ) -> RestResult<TasksResults, C> {
        let query = rest::query_string(query).context(rest::BuildSnafu)?;
        self.request(http_client, Method::GET, "/tasks", query).await
    }

    /// Fetches one task (`GET /tasks/{uid}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn get_task<C: HttpClient>(
        &self,
        http_client: &C,
        task_uid: u32,
    ) -> RestResult<Task, C> {
        self.request(http_client, Method::GET, &format!("/tasks/{task_uid}"), None)
            .await
    }

    /// Cancels the tasks matching `filter` (`POST /tasks/cancel`).
    ///
    /// The engine requires at least one filter; an empty query is rejected
    /// server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn cancel_tasks<C: HttpClient>(
        &self,
        http_client: &C,
        filter: &TasksQuery,
    ) -> RestResult<TaskSummary, C> {
        let query = rest::query_string(filter).context(rest::BuildSnafu)?;
        self.request(http_client, Method::POST, "/tasks/cancel", query)
            .await
    }

    /// Deletes the task records matching `filter` (`DELETE /tasks`).
    ///
    /// The engine requires at least one filter; an empty query is rejected
    /// server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn delete_tasks<C: HttpClient>(
        &self,
        http_client: &C,
        filter: &TasksQuery,
    ) -> RestResult<TaskSummary, C> {
        let query = rest::query_string(filter).context(rest::BuildSnafu)?;
        self.request(http_client, Method::DELETE, "/tasks", query)
            .await
    }

    /// Polls a task at a fixed interval until it reaches a terminal status.
    ///
    /// The task endpoint is queried immediately, then every
    /// [`WaitOptions::interval`] until the status is `succeeded`, `failed`,
    /// or `canceled`. A succeeded poll result can still be a failed task;
    /// callers that care must inspect [`Task::status`].
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Timeout`] once no further poll can land before
    /// [`WaitOptions::timeout`] (see its predictive-cutoff note), or
    /// [`WaitError::Poll`] if a poll request fails.
    pub async fn wait_for_task<C: HttpClient>(
        &self,
        http_client: &C,
        task_uid: u32,
        options: &WaitOptions,
    ) -> Result<Task, WaitError<C::Error, <C::Response as HttpResponse>::Error>> {
        let started = Instant::now();

        loop {
            let task = self
                .get_task(http_client, task_uid)
                .await
                .context(PollSnafu)?;
            if task.status.is_terminal() {
                return Ok(task);
            }

            if started.elapsed() + options.interval >= options.timeout {
                return TimeoutSnafu {
                    task_uid,
                    timeout: options.timeout,
                }
                .fail();
            }

            sleep(options.interval).await;
        }
    }
}
