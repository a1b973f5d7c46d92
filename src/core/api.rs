//! Remote sync API client.
//!
//! The server only ever sees opaque encrypted blobs and their checksums.
//! [`Remote`] is a trait so the sync engine can be exercised against an
//! in-memory fake in tests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Response to a successful blob push.
#[derive(Debug, Deserialize)]
pub struct PushBlobResponse {
    pub version: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Response to a blob pull.
///
/// When `has_update` is false the remote holds nothing newer and the
/// data fields are absent.
#[derive(Debug, Deserialize)]
pub struct PullBlobResponse {
    pub has_update: bool,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub encrypted_data: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct PushBlobRequest<'a> {
    project_id: &'a str,
    encrypted_data: &'a str,
    checksum: &'a str,
}

#[derive(Debug, Serialize)]
struct PullBlobRequest<'a> {
    project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    since_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ValidateTokenResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Transport for encrypted sync blobs.
pub trait Remote {
    /// Upload an encrypted blob; returns the new remote version.
    fn push_blob(
        &self,
        project_id: &str,
        encrypted_data: &str,
        checksum: &str,
    ) -> Result<PushBlobResponse>;

    /// Fetch the latest blob newer than `since_version`, if any.
    fn pull_blob(&self, project_id: &str, since_version: Option<i64>)
        -> Result<PullBlobResponse>;

    /// Verify the configured token is accepted; returns the user id it
    /// belongs to.
    fn validate_token(&self) -> Result<String>;
}

/// HTTP implementation of [`Remote`] against the hosted sync service.
pub struct HttpRemote {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SyncError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "sync request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(SyncError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("server returned {status}"));
            return Err(SyncError::Remote(message).into());
        }

        let parsed = response.json::<R>().map_err(SyncError::Http)?;
        Ok(parsed)
    }
}

impl Remote for HttpRemote {
    fn push_blob(
        &self,
        project_id: &str,
        encrypted_data: &str,
        checksum: &str,
    ) -> Result<PushBlobResponse> {
        self.post(
            "/api/v1/sync/push",
            &PushBlobRequest {
                project_id,
                encrypted_data,
                checksum,
            },
        )
    }

    fn pull_blob(
        &self,
        project_id: &str,
        since_version: Option<i64>,
    ) -> Result<PullBlobResponse> {
        self.post(
            "/api/v1/sync/pull",
            &PullBlobRequest {
                project_id,
                since_version,
            },
        )
    }

    fn validate_token(&self) -> Result<String> {
        let response: ValidateTokenResponse =
            self.post("/api/v1/auth/validate", &serde_json::json!({}))?;
        Ok(response.user_id)
    }
}
