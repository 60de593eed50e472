//! Typed records decoded from AppThwack JSON payloads.
//!
//! Unique responsibility: turn decoded JSON values into typed records,
//! rejecting payloads that miss required fields.
//!
//! Each record enumerates its required fields; [`decode`] checks presence
//! of every one before deserializing, so a malformed payload fails with a
//! validation error naming the first missing field rather than an opaque
//! serde message. Fields the server sends beyond the typed set are kept on
//! the record in a flattened `extra` map, not discarded.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};

/// A record decodable from an AppThwack JSON object.
pub(crate) trait ApiRecord: DeserializeOwned {
    /// Record kind used in validation error messages.
    const KIND: &'static str;
    /// Fields that must be present in the JSON object.
    const REQUIRED: &'static [&'static str];
}

/// Decode a single record, checking required fields first.
pub(crate) fn decode<T: ApiRecord>(value: Value) -> Result<T> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError::UnexpectedShape {
            record: T::KIND,
            expected: "a json object",
        }
        .into());
    };
    for &field in T::REQUIRED {
        if !object.contains_key(field) {
            return Err(ValidationError::MissingField {
                record: T::KIND,
                field,
            }
            .into());
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode a JSON array into a list of records.
pub(crate) fn decode_list<T: ApiRecord>(value: Value) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(ValidationError::UnexpectedShape {
            record: T::KIND,
            expected: "a json array",
        }
        .into());
    };
    items.into_iter().map(decode).collect()
}

/// A named pool of devices to execute runs against.
///
/// Immutable once fetched; scheduling references it by id.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicePool {
    /// Device pool id.
    pub id: u64,
    /// Device pool name.
    pub name: String,
    /// Any additional fields returned by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiRecord for DevicePool {
    const KIND: &'static str = "device pool";
    const REQUIRED: &'static [&'static str] = &["id", "name"];
}

impl fmt::Display for DevicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "devicepool/{}", self.id)
    }
}

/// An uploaded app binary, referenced by id when scheduling runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppFile {
    /// Server-side id of the uploaded file.
    pub file_id: u64,
    /// Any additional fields returned by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiRecord for AppFile {
    const KIND: &'static str = "file";
    const REQUIRED: &'static [&'static str] = &["file_id"];
}

impl fmt::Display for AppFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file/{}", self.file_id)
    }
}

/// Summary block of a run result.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSummary {
    /// Result id.
    pub id: u64,
    /// Vendor-defined run status string.
    pub status: String,
    /// Run name.
    pub name: String,
    /// Account that initiated the run.
    pub initiator: String,
    /// Overall run result string (e.g. pass/fail counts).
    pub result: String,
    /// Any additional fields returned by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only snapshot of a scheduled run's results.
///
/// The summary is always present; the failure/warning breakdowns and
/// performance blocks only appear once the vendor has produced them, so
/// they stay optional and untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct RunResult {
    /// Run summary block.
    pub summary: RunSummary,
    /// Failures grouped by job.
    pub failures_by_job: Option<Value>,
    /// Failures grouped by device.
    pub failures_by_device: Option<Value>,
    /// Failures grouped by type.
    pub failures_by_type: Option<Value>,
    /// Warnings grouped by job.
    pub warnings_by_job: Option<Value>,
    /// Warnings grouped by device.
    pub warnings_by_device: Option<Value>,
    /// Warnings grouped by type.
    pub warnings_by_type: Option<Value>,
    /// Raw performance samples.
    pub performance: Option<Value>,
    /// Aggregated performance summary.
    pub performance_summary: Option<Value>,
    /// Any additional fields returned by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiRecord for RunResult {
    const KIND: &'static str = "run result";
    const REQUIRED: &'static [&'static str] = &["summary"];
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]: Run {} by {} is '{}' with result '{}'.",
            self.summary.id,
            self.summary.name,
            self.summary.initiator,
            self.summary.status,
            self.summary.result
        )
    }
}
