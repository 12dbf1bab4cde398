// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Hakuna time tracking REST API client.
//!
//! Every logical operation is mapped to exactly one authenticated HTTP request. Responses are
//! either decoded into the typed records of the [`model`] module or classified into an
//! [`ApiError`].

use awc::error::PayloadError;
use awc::http::{Method, StatusCode, header};
use chrono::{Datelike, Local, NaiveDate};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::configuration::{ApiSettings, ENV_API_MSG_TRACING};
use crate::errors::ApiError;
use crate::util::{bool_from_env, new_http_client};

#[cfg(test)]
pub(crate) mod mock;
pub mod model;
mod open_entries;

pub use model::*;
pub use open_entries::*;

/// Header name of the API token.
const AUTH_HEADER: &str = "X-Auth-Token";
/// Header name and value of the requested API version.
const VERSION_HEADER: (&str, &str) = ("Accept-Version", "v1");
/// Response body limit. The largest responses are time entry lists.
const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024;

/// Query parameters of a request.
pub type Query = Vec<(&'static str, String)>;

/// Hakuna API client.
///
/// Stateless except for the credentials and the shared HTTP connection pool. Cloning is cheap and
/// all clones share the same connection pool.
#[derive(Clone)]
pub struct HakunaClient {
    /// Client identifier for logging: API host.
    id: String,
    base_url: Url,
    token: String,
    company: Option<String>,
    client: awc::Client,
    msg_tracing: bool,
}

impl HakunaClient {
    /// Create a new API client from the given account settings.
    ///
    /// Attention: [`awc::Client`] is bound to the current thread and must be created within an
    /// Actix system.
    pub fn new(settings: &ApiSettings) -> Self {
        let client = new_http_client(settings.connection_timeout, settings.request_timeout);
        Self::with_client(settings, client)
    }

    /// Create a new API client with an existing HTTP client.
    pub fn with_client(settings: &ApiSettings, client: awc::Client) -> Self {
        let base_url = settings.url.clone();
        let id = base_url.host_str().unwrap_or(base_url.as_str()).to_string();
        Self {
            id,
            base_url,
            token: settings.token.clone(),
            company: settings.company.clone(),
            client,
            msg_tracing: bool_from_env(ENV_API_MSG_TRACING),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}{endpoint}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Perform an authenticated request and classify the response.
    ///
    /// Returns:
    /// - `Ok(Some(value))` for a 2xx response with a JSON body
    /// - `Ok(None)` for 204 or an empty body
    /// - [`ApiError::Auth`] for 401
    /// - [`ApiError::RateLimit`] for 429 including the `Retry-After` header value if available
    /// - [`ApiError::Status`] for every other status >= 400
    /// - [`ApiError::Connection`] for transport errors
    /// - [`ApiError::InvalidResponse`] for an oversized or undecodable body
    async fn request<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&Query>,
        body: Option<&B>,
    ) -> Result<Option<Value>, ApiError> {
        debug!("[{}] <- {method} {endpoint}", self.id);

        let mut request = self
            .client
            .request(method.clone(), self.endpoint_url(endpoint))
            .insert_header((AUTH_HEADER, self.token.as_str()))
            .insert_header(VERSION_HEADER)
            .insert_header((header::CONTENT_TYPE, "application/json"));
        if let Some(query) = query {
            request = request
                .query(query)
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        }

        let result = match body {
            Some(body) => request.send_json(body).await,
            None => request.send().await,
        };
        let mut response = result.map_err(|e| {
            warn!("[{}] {method} {endpoint} failed: {e}", self.id);
            ApiError::Connection(e.to_string())
        })?;

        let status = response.status();
        debug!("[{}] -> {method} {endpoint}: {status}", self.id);

        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Auth),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.to_string());
                return Err(ApiError::RateLimit { retry_after });
            }
            _ => {}
        }

        let payload = response
            .body()
            .limit(MAX_RESPONSE_SIZE)
            .await
            .map_err(|e| match e {
                PayloadError::Overflow => ApiError::InvalidResponse(format!(
                    "{endpoint}: response exceeds {MAX_RESPONSE_SIZE} bytes"
                )),
                e => ApiError::Connection(e.to_string()),
            })?;

        if status.as_u16() >= 400 {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&payload).trim().to_string(),
            });
        }

        if self.msg_tracing {
            debug!(
                "[{}] -> {endpoint}: {}",
                self.id,
                String::from_utf8_lossy(&payload)
            );
        }

        if status == StatusCode::NO_CONTENT || payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&payload)
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("{endpoint}: {e}")))
    }

    async fn get(&self, endpoint: &str, query: Option<&Query>) -> Result<Option<Value>, ApiError> {
        self.request::<()>(Method::GET, endpoint, query, None).await
    }

    async fn get_object<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&Query>,
    ) -> Result<T, ApiError> {
        match self.get(endpoint, query).await? {
            Some(value) => decode(endpoint, value),
            None => Err(ApiError::InvalidResponse(format!(
                "{endpoint}: empty response"
            ))),
        }
    }

    /// Get a list resource. No content is returned as an empty list.
    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&Query>,
    ) -> Result<Vec<T>, ApiError> {
        match self.get(endpoint, query).await? {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(value) => decode(endpoint, value),
        }
    }

    // ==================== Timer ====================

    /// Get the current timer.
    ///
    /// Returns `None` if no timer is running: the API either responds with 404, no content, or a
    /// timer object without a date.
    pub async fn get_timer(&self) -> Result<Option<Timer>, ApiError> {
        match self.get("/timer", None).await {
            Ok(Some(value)) => timer_from_value(value),
            Ok(None) => Ok(None),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Start a new timer.
    ///
    /// Without a task id the API uses the configured default task of the company, if there is
    /// one.
    pub async fn start_timer(
        &self,
        task_id: Option<u64>,
        project_id: Option<u64>,
        note: Option<&str>,
    ) -> Result<Option<Timer>, ApiError> {
        let msg = StartTimerMsg {
            task_id,
            project_id,
            note,
        };
        let body = if msg.is_empty() { None } else { Some(&msg) };
        match self.request(Method::POST, "/timer", None, body).await? {
            Some(value) => timer_from_value(value),
            None => Ok(None),
        }
    }

    /// Stop the running timer. This creates a new time entry.
    pub async fn stop_timer(&self) -> Result<Option<TimeEntry>, ApiError> {
        match self.request::<()>(Method::PUT, "/timer", None, None).await? {
            Some(value) => decode("/timer", value).map(Some),
            None => Ok(None),
        }
    }

    /// Cancel the running timer without creating a time entry.
    pub async fn cancel_timer(&self) -> Result<(), ApiError> {
        self.request::<()>(Method::DELETE, "/timer", None, None)
            .await
            .map(|_| ())
    }

    /// Check if a timer is currently running.
    pub async fn is_timer_running(&self) -> Result<bool, ApiError> {
        Ok(self.get_timer().await?.is_some())
    }

    // ==================== Overview ====================

    /// Get overtime and vacation overview.
    ///
    /// The overview of another user requires supervisor or admin permissions.
    pub async fn get_overview(&self, user_id: Option<u64>) -> Result<Overview, ApiError> {
        let query = user_id.map(|id| vec![("user_id", id.to_string())]);
        self.get_object("/overview", query.as_ref()).await
    }

    // ==================== Time entries ====================

    /// Get time entries for a date range. The end date defaults to the start date.
    pub async fn get_time_entries(
        &self,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        user_id: Option<u64>,
    ) -> Result<Vec<TimeEntry>, ApiError> {
        let query = time_entries_query(start_date, end_date, user_id);
        self.get_list("/time_entries", Some(&query)).await
    }

    /// Get a single time entry.
    pub async fn get_time_entry(&self, entry_id: u64) -> Result<TimeEntry, ApiError> {
        self.get_object(&format!("/time_entries/{entry_id}"), None)
            .await
    }

    // ==================== Absences ====================

    /// Get absences for a year. The year defaults to the current year.
    pub async fn get_absences(
        &self,
        year: Option<i32>,
        user_id: Option<u64>,
    ) -> Result<Vec<Absence>, ApiError> {
        let query = absences_query(year, user_id, Local::now().date_naive());
        self.get_list("/absences", Some(&query)).await
    }

    /// Get the list of absence types.
    pub async fn get_absence_types(&self) -> Result<Vec<AbsenceType>, ApiError> {
        self.get_list("/absence_types", None).await
    }

    // ==================== Users & presence ====================

    /// Get the users which can be managed with the API token.
    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list("/users", None).await
    }

    /// Get today's presence information of all users.
    pub async fn get_presence(&self) -> Result<Vec<PresenceEntry>, ApiError> {
        self.get_list("/presence", None).await
    }

    // ==================== Projects & tasks ====================

    pub async fn get_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_list("/projects", None).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_list("/tasks", None).await
    }

    // ==================== Company ====================

    pub async fn get_company(&self) -> Result<Company, ApiError> {
        self.get_object("/company", None).await
    }

    /// Connectivity check. This request doesn't count against the rate limit.
    pub async fn ping(&self) -> Result<Pong, ApiError> {
        match self.get("/ping", None).await? {
            Some(value) => decode("/ping", value),
            None => Ok(Pong::default()),
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(format!("{endpoint}: {e}")))
}

/// A timer object without date means that no timer is running.
fn timer_from_value(value: Value) -> Result<Option<Timer>, ApiError> {
    match value.get("date") {
        None | Some(Value::Null) => Ok(None),
        Some(_) => decode("/timer", value).map(Some),
    }
}

/// Query parameters for `GET /time_entries`.
pub fn time_entries_query(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    user_id: Option<u64>,
) -> Query {
    let end_date = end_date.unwrap_or(start_date);
    let mut query = vec![
        ("start_date", start_date.format("%Y-%m-%d").to_string()),
        ("end_date", end_date.format("%Y-%m-%d").to_string()),
    ];
    if let Some(user_id) = user_id {
        query.push(("user_id", user_id.to_string()));
    }
    query
}

/// Query parameters for `GET /absences`.
pub fn absences_query(year: Option<i32>, user_id: Option<u64>, today: NaiveDate) -> Query {
    let mut query = vec![("year", year.unwrap_or(today.year()).to_string())];
    if let Some(user_id) = user_id {
        query.push(("user_id", user_id.to_string()));
    }
    query
}
