// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use roster_app::{RecordStore, StoreError, StoreResult, Student, StudentDraft, StudentId};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TABLE: &str = "students";
const REST_PREFIX: &str = "rest/v1/";
const UNIQUE_VIOLATION: &str = "23505";

/// Client for the hosted `students` table, speaking the PostgREST dialect
/// the service exposes under `/rest/v1`.
#[derive(Debug, Clone)]
pub struct RestStore {
    table_url: Url,
    api_key: String,
    timeout: Duration,
    http: HttpClient,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            bail!("store.url must not be empty -- set [store].url or ROSTER_STORE_URL");
        }
        if api_key.trim().is_empty() {
            bail!("store.api_key must not be empty -- set [store].api_key or ROSTER_STORE_KEY");
        }
        let table = table.trim();
        if !is_table_name(table) {
            bail!(
                "store.table {table:?} is not a table name -- use letters, digits, and underscores"
            );
        }
        if timeout.is_zero() {
            bail!("store.timeout must be positive");
        }

        let base = Url::parse(&format!("{base_url}/"))
            .with_context(|| format!("parse store url {base_url:?}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!(
                "store url {base_url:?} must use http or https, got {:?}",
                base.scheme()
            );
        }
        let table_url = base
            .join(REST_PREFIX)
            .and_then(|rest| rest.join(table))
            .with_context(|| format!("build table url for {table:?}"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            table_url,
            api_key: api_key.trim().to_owned(),
            timeout,
            http,
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn row_url(&self, id: &StudentId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id.as_str()));
        url
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> StoreResult<Response> {
        let response = self.authorized(request).send().map_err(|error| {
            tracing::warn!(operation, %error, "store request failed");
            let origin = self.table_url.origin().ascii_serialization();
            StoreError::Unreachable(format!("{origin} ({error})"))
        })?;

        let status = response.status();
        tracing::debug!(operation, status = status.as_u16(), "store responded");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    /// Sends a filtered mutation that asks for the affected rows back, so
    /// an id that matched nothing is reported instead of silently ignored.
    fn expect_affected(
        &self,
        operation: &'static str,
        id: &StudentId,
        request: RequestBuilder,
    ) -> StoreResult<()> {
        let response = self.send(
            operation,
            request.header("Prefer", "return=representation"),
        )?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .map_err(|error| StoreError::Decode(format!("{operation} response: {error}")))?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

impl RecordStore for RestStore {
    fn list(&mut self) -> StoreResult<Vec<Student>> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "name.asc");
        let response = self.send("list", self.http.get(url))?;
        response
            .json()
            .map_err(|error| StoreError::Decode(format!("student rows: {error}")))
    }

    fn insert(&mut self, draft: &StudentDraft) -> StoreResult<()> {
        let request = self
            .http
            .post(self.table_url.clone())
            .header("Prefer", "return=minimal")
            .json(&[draft]);
        self.send("insert", request)?;
        Ok(())
    }

    fn update(&mut self, id: &StudentId, draft: &StudentDraft) -> StoreResult<()> {
        let request = self.http.patch(self.row_url(id)).json(draft);
        self.expect_affected("update", id, request)
    }

    fn delete(&mut self, id: &StudentId) -> StoreResult<()> {
        let request = self.http.delete(self.row_url(id));
        self.expect_affected("delete", id, request)
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> StoreError {
    if let Ok(parsed) = serde_json::from_str::<PostgrestError>(body)
        && let Some(message) = parsed.message.filter(|message| !message.is_empty())
    {
        if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
            let message = match parsed.details.filter(|details| !details.is_empty()) {
                Some(details) => format!("{message} ({details})"),
                None => message,
            };
            return StoreError::Conflict(message);
        }
        return StoreError::Rejected {
            status: status.as_u16(),
            message,
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return StoreError::Rejected {
            status: status.as_u16(),
            message: trimmed.to_owned(),
        };
    }

    StoreError::Rejected {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned(),
    }
}

fn is_table_name(table: &str) -> bool {
    !table.is_empty() && table.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
