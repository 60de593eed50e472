//! AppThwack run lifecycle.
//!
//! Unique responsibility: poll, fetch, cancel, and download a scheduled
//! run.
//!
//! Endpoints used:
//! - GET `/api/run/<project_id>/<run_id>/status`
//! - GET `/api/run/<project_id>/<run_id>`
//! - PUT `/api/run/<project_id>/<run_id>/cancel`
//! - GET `/api/run/<project_id>/<run_id>?format=archive`
//!
//! A run moves scheduled -> running -> completed; the vendor's status
//! strings are opaque to this client and returned verbatim. Results are
//! only meaningful once the run has completed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::thwack_records::{ApiRecord, RunResult, decode};
use crate::thwack_transport::ApiTransport;

/// Fixed local filename the results archive is written to.
const ARCHIVE_FILENAME: &str = "tmp.zip";

#[derive(Debug, Deserialize)]
struct RunRecord {
    run_id: u64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ApiRecord for RunRecord {
    const KIND: &'static str = "run";
    const REQUIRED: &'static [&'static str] = &["run_id"];
}

#[derive(Debug, Deserialize)]
struct RunStatus {
    status: String,
}

impl ApiRecord for RunStatus {
    const KIND: &'static str = "run status";
    const REQUIRED: &'static [&'static str] = &["status"];
}

/// A scheduled run on an AppThwack project.
#[derive(Debug, Clone)]
pub struct Run {
    transport: ApiTransport,
    /// Id of the project the run belongs to.
    pub project_id: u64,
    /// Run id.
    pub run_id: u64,
    /// Any additional fields returned when the run was scheduled.
    pub extra: Map<String, Value>,
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run/{}/{}", self.project_id, self.run_id)
    }
}

impl Run {
    /// Decode a scheduling response and attach the shared transport.
    pub(crate) fn from_value(
        value: Value,
        project_id: u64,
        transport: ApiTransport,
    ) -> Result<Self> {
        let record: RunRecord = decode(value)?;
        Ok(Self {
            transport,
            project_id,
            run_id: record.run_id,
            extra: record.extra,
        })
    }

    /// Build a handle for a known run id without a server roundtrip.
    pub(crate) fn from_parts(project_id: u64, run_id: u64, transport: ApiTransport) -> Self {
        Self {
            transport,
            project_id,
            run_id,
            extra: Map::new(),
        }
    }

    /// Return the vendor-defined execution status string for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload lacks the
    /// `status` field.
    pub async fn status(&self) -> Result<String> {
        let (project_id, run_id) = (self.project_id.to_string(), self.run_id.to_string());
        let data = self
            .transport
            .get_json(&["run", &project_id, &run_id, "status"])
            .await?;
        let status: RunStatus = decode(data)?;
        Ok(status.status)
    }

    /// Fetch the [`RunResult`] snapshot for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    pub async fn results(&self) -> Result<RunResult> {
        let (project_id, run_id) = (self.project_id.to_string(), self.run_id.to_string());
        let data = self
            .transport
            .get_json(&["run", &project_id, &run_id])
            .await?;
        decode(data)
    }

    /// Cancel this run, returning the server's acknowledgement payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cancel(&self) -> Result<Value> {
        let (project_id, run_id) = (self.project_id.to_string(), self.run_id.to_string());
        self.transport
            .put_json(&["run", &project_id, &run_id, "cancel"])
            .await
    }

    /// Download the raw results archive to the fixed local filename
    /// `tmp.zip`, overwriting any existing file.
    ///
    /// Returns the path written to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the archive cannot be
    /// written.
    pub async fn download(&self) -> Result<PathBuf> {
        let dest = PathBuf::from(ARCHIVE_FILENAME);
        self.download_to(&dest).await?;
        Ok(dest)
    }

    /// Download the raw results archive to `dest`, streaming it to disk in
    /// chunks.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the archive cannot be
    /// written.
    pub async fn download_to(&self, dest: &Path) -> Result<u64> {
        let (project_id, run_id) = (self.project_id.to_string(), self.run_id.to_string());
        self.transport
            .download(
                &["run", &project_id, &run_id],
                &[("format", "archive")],
                dest,
            )
            .await
    }
}
