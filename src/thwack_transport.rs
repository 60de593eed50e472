//! AppThwack HTTP transport.
//!
//! Unique responsibility: build endpoint URLs, attach authentication, and
//! validate responses for every AppThwack REST call.
//!
//! API surface:
//! - Base: `https://appthwack.com/api/...`
//! - Auth: HTTP basic auth, API key as username, empty password.
//!
//! Every operation in this crate goes through one of the request helpers
//! here, which enforce a single contract: an exact expected status code and
//! an expected content-type. Anything else is surfaced as an
//! [`ApiError`](crate::error::ApiError) carrying the observed and expected
//! values and the response body. Failures are terminal; there is no retry.

use std::{
    env,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    time::Duration,
};

use reqwest::{StatusCode, header};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, ThwackError, ValidationError};

/// Default server domain hosting the AppThwack API.
const DOMAIN: &str = "https://appthwack.com";

/// Default API endpoint root under the domain.
const ROOT: &str = "api";

/// Default HTTP request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default user agent for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("thwack-client/", env!("CARGO_PKG_VERSION"));

/// Content-type expected from every JSON endpoint.
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// Content-type expected from the results archive endpoint.
pub(crate) const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Configuration for the AppThwack transport.
#[derive(Clone, Debug)]
pub struct ThwackConfig {
    /// AppThwack account API key, used as the basic-auth username.
    /// Env: `APPTHWACK_API_KEY` (required)
    pub api_key: String,

    /// Server domain hosting the AppThwack API. Used for testing.
    /// Env: `APPTHWACK_DOMAIN` (default: "<https://appthwack.com>")
    pub domain: String,

    /// API endpoint root under the domain. Used for testing.
    /// Env: `APPTHWACK_API_ROOT` (default: "api")
    pub api_root: String,

    /// HTTP request timeout in milliseconds.
    /// Env: `APPTHWACK_HTTP_TIMEOUT_MS` (default: 30000)
    pub timeout_ms: u64,

    /// User agent for HTTP requests.
    /// Env: `APPTHWACK_USER_AGENT` (default: "thwack-client/<version>")
    pub user_agent: String,
}

impl ThwackConfig {
    /// Create a configuration with the given API key and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ValidationError::MissingApiKey.into());
        }
        Ok(Self {
            api_key,
            domain: DOMAIN.to_string(),
            api_root: ROOT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// In local dev, this will also attempt to load `.env` from the current
    /// directory. If `.env` is missing, it does not fail.
    ///
    /// # Errors
    ///
    /// Returns an error if `APPTHWACK_API_KEY` is missing or empty, or if an
    /// optional variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_key = env::var("APPTHWACK_API_KEY").unwrap_or_default();
        let mut cfg = Self::new(api_key)?;

        if let Ok(domain) = env::var("APPTHWACK_DOMAIN") {
            cfg.domain = domain;
        }
        if let Ok(root) = env::var("APPTHWACK_API_ROOT") {
            cfg.api_root = root;
        }
        cfg.timeout_ms = parse_u64_env("APPTHWACK_HTTP_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if let Ok(agent) = env::var("APPTHWACK_USER_AGENT") {
            cfg.user_agent = agent;
        }

        Ok(cfg)
    }
}

/// Shared REST transport composed into every resource that issues requests.
///
/// Cloning is cheap: the inner `reqwest::Client` is reference-counted.
#[derive(Clone, Debug)]
pub struct ApiTransport {
    cfg: ThwackConfig,
    http: reqwest::Client,
}

impl ApiTransport {
    /// Create a new transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: ThwackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()?;

        Ok(Self { cfg, http })
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ThwackConfig {
        &self.cfg
    }

    /// Build a URL to a REST endpoint from the configured domain and root.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = format!(
            "{}/{}",
            self.cfg.domain.trim_end_matches('/'),
            self.cfg.api_root.trim_matches('/')
        );
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Perform a GET which expects status 200 and `application/json`.
    pub(crate) async fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let resp = self.authed(self.http.get(&url)).send().await?;
        Self::json_body(resp).await
    }

    /// Perform a PUT which expects status 200 and `application/json`.
    pub(crate) async fn put_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments);
        debug!(%url, "PUT");
        let resp = self.authed(self.http.put(&url)).send().await?;
        Self::json_body(resp).await
    }

    /// Perform a form-encoded POST which expects status 200 and
    /// `application/json`.
    pub(crate) async fn post_form(
        &self,
        segments: &[&str],
        fields: &[(&str, String)],
    ) -> Result<Value> {
        let url = self.endpoint(segments);
        debug!(%url, fields = fields.len(), "POST form");
        let resp = self.authed(self.http.post(&url)).form(fields).send().await?;
        Self::json_body(resp).await
    }

    /// Perform a multipart POST which expects status 200 and
    /// `application/json`.
    pub(crate) async fn post_multipart(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<Value> {
        let url = self.endpoint(segments);
        debug!(%url, "POST multipart");
        let resp = self
            .authed(self.http.post(&url))
            .multipart(form)
            .send()
            .await?;
        Self::json_body(resp).await
    }

    /// Perform a GET which expects status 200 and `application/zip`,
    /// streaming the body to `dest` in chunks.
    ///
    /// Returns the number of bytes written.
    pub(crate) async fn download(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        dest: &Path,
    ) -> Result<u64> {
        let url = self.endpoint(segments);
        debug!(%url, dest = %dest.display(), "GET archive");
        let resp = self
            .authed(self.http.get(&url))
            .query(query)
            .send()
            .await?;
        let mut resp = Self::expect(resp, StatusCode::OK, ZIP_CONTENT_TYPE).await?;

        let mut file = BufWriter::new(File::create(dest)?);
        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk)?;
            written = written.saturating_add(chunk.len() as u64);
        }
        file.flush()?;
        trace!(written, "archive written");
        Ok(written)
    }

    /// Attach basic auth: API key as username, empty password.
    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.basic_auth(&self.cfg.api_key, None::<&str>)
    }

    /// Validate the response and decode its body as JSON.
    async fn json_body(resp: reqwest::Response) -> Result<Value> {
        let resp = Self::expect(resp, StatusCode::OK, JSON_CONTENT_TYPE).await?;
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate a response against an exact status code and content-type.
    ///
    /// Status is checked first; a mismatch on either consumes the body into
    /// the resulting error for diagnostics.
    async fn expect(
        resp: reqwest::Response,
        expected_status: StatusCode,
        expected_content_type: &'static str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        trace!(status = status.as_u16(), content_type = ?content_type, "response");

        if status != expected_status {
            let body = resp.text().await.unwrap_or_default();
            return Err(ThwackError::Api(crate::error::ApiError::UnexpectedStatus {
                expected: expected_status.as_u16(),
                actual: status.as_u16(),
                body,
            }));
        }

        if !content_type_matches(expected_content_type, content_type.as_deref()) {
            let body = resp.text().await.unwrap_or_default();
            return Err(ThwackError::Api(
                crate::error::ApiError::UnexpectedContentType {
                    expected: expected_content_type,
                    actual: content_type,
                    body,
                },
            ));
        }

        Ok(resp)
    }
}

/// Case-insensitive containment check between the expected content-type and
/// the actual header value. An absent header only matches an empty
/// expectation.
fn content_type_matches(expected: &str, actual: Option<&str>) -> bool {
    match actual {
        Some(actual) => actual
            .to_ascii_lowercase()
            .contains(&expected.to_ascii_lowercase()),
        None => expected.is_empty(),
    }
}

fn parse_u64_env(key: &'static str, default: u64) -> Result<u64> {
    env::var(key).map_or_else(
        |_| Ok(default),
        |v| {
            v.parse::<u64>().map_err(|_| {
                ValidationError::InvalidEnv {
                    key,
                    reason: "expected an unsigned integer",
                }
                .into()
            })
        },
    )
}
