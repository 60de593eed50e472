//! AppThwack top-level API client.
//!
//! Unique responsibility: expose the account-level endpoints and hand out
//! [`Project`] handles.
//!
//! Endpoints used:
//! - GET `/api/project`
//! - POST `/api/file`
//!
//! All configuration is loaded from environment variables or provided
//! explicitly; see [`ThwackConfig`].

use std::path::Path;

use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::thwack_project::Project;
use crate::thwack_records::{AppFile, decode};
use crate::thwack_transport::{ApiTransport, ThwackConfig};

/// Client for the AppThwack REST API.
///
/// Value-like resource records returned by this client ([`Project`],
/// [`crate::Run`]) carry a clone of the underlying transport, so the
/// client itself can be dropped once handles are obtained.
#[derive(Debug, Clone)]
pub struct ThwackApi {
    transport: ApiTransport,
}

impl ThwackApi {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: ThwackConfig) -> Result<Self> {
        Ok(Self {
            transport: ApiTransport::new(cfg)?,
        })
    }

    /// Create a client configured from environment variables
    /// (`APPTHWACK_API_KEY` et al.).
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client cannot
    /// be built.
    pub fn from_env() -> Result<Self> {
        Self::new(ThwackConfig::from_env()?)
    }

    /// Create a client with the given API key and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be built.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ThwackConfig::new(api_key)?)
    }

    /// List all projects tied to this account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    pub async fn projects(&self) -> Result<Vec<Project>> {
        let data = self.transport.get_json(&["project"]).await?;
        let serde_json::Value::Array(items) = data else {
            return Err(ValidationError::UnexpectedShape {
                record: "project",
                expected: "a json array",
            }
            .into());
        };
        items
            .into_iter()
            .map(|item| Project::from_value(item, self.transport.clone()))
            .collect()
    }

    /// Find a project by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the project listing fails.
    pub async fn project_by_id(&self, id: u64) -> Result<Option<Project>> {
        Ok(self.projects().await?.into_iter().find(|p| p.id == id))
    }

    /// Find a project by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the project listing fails.
    pub async fn project_by_name(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.projects().await?.into_iter().find(|p| p.name == name))
    }

    /// Upload an app binary (.apk or .ipa) or test archive.
    ///
    /// The path must carry a file extension; this is checked before any
    /// file or network I/O. `name` is the name shown on AppThwack and
    /// defaults to the local filename.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the path has no extension, an I/O
    /// error if the file cannot be read, or an API error if the upload is
    /// rejected.
    pub async fn upload(&self, path: &Path, name: Option<&str>) -> Result<AppFile> {
        let path = std::path::absolute(path)?;
        if path.extension().is_none_or(|ext| ext.is_empty()) {
            return Err(ValidationError::MissingExtension { path }.into());
        }
        let name = name.map_or_else(
            || path.file_name().unwrap_or_default().to_string_lossy().into_owned(),
            str::to_owned,
        );

        debug!(name = %name, path = %path.display(), "uploading app");
        let bytes = std::fs::read(&path)?;
        let form = reqwest::multipart::Form::new()
            .text("name", name.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(name),
            );
        let data = self.transport.post_multipart(&["file"], form).await?;
        decode(data)
    }
}
