//! AppThwack projects and run scheduling.
//!
//! Unique responsibility: represent a project and schedule runs on it.
//!
//! Endpoints used:
//! - GET `/api/devicepool/<project_id>`
//! - POST `/api/run`
//!
//! A project's platform kind (decoded from the 1-based `project_type_id`)
//! gates which scheduling operations it accepts: Android projects run
//! JUnit/Robotium, Calabash, MonkeyTalk, and AppExplorer suites; iOS
//! projects run UIA, Calabash, and KIF; web projects only take a target
//! URL. Scheduling sends the project id, run name, app file id, optional
//! device pool, and the type-specific fields, omitting every unset
//! optional.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};
use crate::thwack_records::{ApiRecord, AppFile, DevicePool, decode, decode_list};
use crate::thwack_run::Run;
use crate::thwack_transport::ApiTransport;

/// Platform kind of an AppThwack project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// Android project (.apk uploads).
    Android,
    /// Responsive web project (tested by URL).
    Web,
    /// iOS project (.ipa uploads).
    Ios,
}

impl ProjectKind {
    /// Select the kind from the server's 1-based `project_type_id`.
    ///
    /// Unknown or absent type ids fall back to Android, mirroring the
    /// vendor's default project type.
    #[must_use]
    pub(crate) const fn from_type_id(type_id: u64) -> Self {
        match type_id {
            2 => Self::Web,
            3 => Self::Ios,
            _ => Self::Android,
        }
    }

    /// Lowercase platform name (e.g. for error messages).
    #[must_use]
    pub const fn platform(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Web => "web",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform())
    }
}

/// Optional knobs for an AppExplorer run.
#[derive(Debug, Clone, Default)]
pub struct AppExplorerOptions {
    /// Username the explorer logs in with.
    pub username: Option<String>,
    /// Password the explorer logs in with.
    pub password: Option<String>,
    /// Launch data handed to the app on startup.
    pub launchdata: Option<String>,
    /// Number of monkey events to fire.
    pub eventcount: Option<u32>,
    /// Seed for the event monkey, for reproducible runs.
    pub monkeyseed: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProjectRecord {
    id: u64,
    name: String,
    url: String,
    #[serde(default)]
    project_type_id: Option<u64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ApiRecord for ProjectRecord {
    const KIND: &'static str = "project";
    const REQUIRED: &'static [&'static str] = &["id", "name", "url"];
}

/// An AppThwack project: container scoping apps, device pools, and runs.
#[derive(Debug, Clone)]
pub struct Project {
    transport: ApiTransport,
    /// Project id.
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Project base URL segment.
    pub url: String,
    /// Platform kind, decoded from `project_type_id`.
    pub kind: ProjectKind,
    /// Any additional fields returned by the server.
    pub extra: Map<String, Value>,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project/{}", self.url)
    }
}

impl Project {
    /// Decode a project payload and attach the shared transport.
    pub(crate) fn from_value(value: Value, transport: ApiTransport) -> Result<Self> {
        let record: ProjectRecord = decode(value)?;
        let kind = ProjectKind::from_type_id(record.project_type_id.unwrap_or(1));
        Ok(Self {
            transport,
            id: record.id,
            name: record.name,
            url: record.url,
            kind,
            extra: record.extra,
        })
    }

    /// List all device pools available to this project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is invalid.
    pub async fn device_pools(&self) -> Result<Vec<DevicePool>> {
        let project_id = self.id.to_string();
        let data = self.transport.get_json(&["devicepool", &project_id]).await?;
        decode_list(data)
    }

    /// Find a device pool by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool listing fails.
    pub async fn device_pool_by_id(&self, id: u64) -> Result<Option<DevicePool>> {
        Ok(self.device_pools().await?.into_iter().find(|p| p.id == id))
    }

    /// Find a device pool by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool listing fails.
    pub async fn device_pool_by_name(&self, name: &str) -> Result<Option<DevicePool>> {
        Ok(self
            .device_pools()
            .await?
            .into_iter()
            .find(|p| p.name == name))
    }

    /// Get a [`Run`] handle for a previously scheduled run id.
    #[must_use]
    pub fn run(&self, run_id: u64) -> Run {
        Run::from_parts(self.id, run_id, self.transport.clone())
    }

    /// Schedule a JUnit/Robotium run (Android only).
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-Android projects, or an API error
    /// if the request fails.
    pub async fn schedule_junit_run(
        &self,
        app: &AppFile,
        test_app: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
        test_filter: Option<&str>,
    ) -> Result<Run> {
        self.ensure_schedulable("junit", &[ProjectKind::Android])?;
        let mut options = vec![("junit", test_app.file_id.to_string())];
        if let Some(filter) = test_filter {
            options.push(("testfilter", filter.to_string()));
        }
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule a Calabash run (Android or iOS).
    ///
    /// `scripts` is the uploaded features archive; `tags` are passed to the
    /// Calabash runner verbatim.
    ///
    /// # Errors
    ///
    /// Returns a validation error on web projects, or an API error if the
    /// request fails.
    pub async fn schedule_calabash_run(
        &self,
        app: &AppFile,
        scripts: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
        tags: Option<&str>,
    ) -> Result<Run> {
        self.ensure_schedulable("calabash", &[ProjectKind::Android, ProjectKind::Ios])?;
        let mut options = vec![("calabash", scripts.file_id.to_string())];
        if let Some(tags) = tags {
            options.push(("calabashtags", tags.to_string()));
        }
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule a MonkeyTalk run (Android only).
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-Android projects, or an API error
    /// if the request fails.
    pub async fn schedule_monkeytalk_run(
        &self,
        app: &AppFile,
        tests: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
    ) -> Result<Run> {
        self.ensure_schedulable("monkeytalk", &[ProjectKind::Android])?;
        let options = vec![("monkeytalk", tests.file_id.to_string())];
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule an AppExplorer run (Android only).
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-Android projects, or an API error
    /// if the request fails.
    pub async fn schedule_app_explorer_run(
        &self,
        app: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
        explorer: &AppExplorerOptions,
    ) -> Result<Run> {
        self.ensure_schedulable("app explorer", &[ProjectKind::Android])?;
        let mut options = Vec::new();
        if let Some(username) = &explorer.username {
            options.push(("username", username.clone()));
        }
        if let Some(password) = &explorer.password {
            options.push(("password", password.clone()));
        }
        if let Some(launchdata) = &explorer.launchdata {
            options.push(("launchdata", launchdata.clone()));
        }
        if let Some(eventcount) = explorer.eventcount {
            options.push(("eventcount", eventcount.to_string()));
        }
        if let Some(monkeyseed) = explorer.monkeyseed {
            options.push(("monkeyseed", monkeyseed.to_string()));
        }
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule a UIA run (iOS only).
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-iOS projects, or an API error if
    /// the request fails.
    pub async fn schedule_uia_run(
        &self,
        app: &AppFile,
        scripts: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
    ) -> Result<Run> {
        self.ensure_schedulable("uia", &[ProjectKind::Ios])?;
        let options = vec![("uia", scripts.file_id.to_string())];
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule a KIF run (iOS only).
    ///
    /// KIF needs no extra upload; the empty `kif` field selects the suite.
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-iOS projects, or an API error if
    /// the request fails.
    pub async fn schedule_kif_run(
        &self,
        app: &AppFile,
        name: &str,
        pool: Option<&DevicePool>,
    ) -> Result<Run> {
        self.ensure_schedulable("kif", &[ProjectKind::Ios])?;
        let options = vec![("kif", String::new())];
        self.schedule_run(app.file_id.to_string(), name, pool, options)
            .await
    }

    /// Schedule a responsive web run (web only).
    ///
    /// Web runs carry only the target URL (sent as the `app` field) and a
    /// run name; no pool or suite options apply.
    ///
    /// # Errors
    ///
    /// Returns a validation error on non-web projects, or an API error if
    /// the request fails.
    pub async fn schedule_web_run(&self, url: &str, name: &str) -> Result<Run> {
        self.ensure_schedulable("web", &[ProjectKind::Web])?;
        self.schedule_run(url.to_string(), name, None, Vec::new())
            .await
    }

    /// Check that a test kind is schedulable on this project's platform.
    fn ensure_schedulable(&self, test: &'static str, allowed: &[ProjectKind]) -> Result<()> {
        if allowed.contains(&self.kind) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedTestKind {
                test,
                platform: self.kind.platform(),
            }
            .into())
        }
    }

    /// POST the run request and decode the scheduled run.
    async fn schedule_run(
        &self,
        app_value: String,
        name: &str,
        pool: Option<&DevicePool>,
        options: Vec<(&'static str, String)>,
    ) -> Result<Run> {
        let fields = run_form(self.id, name, app_value, pool, options);
        let data = self.transport.post_form(&["run"], &fields).await?;
        Run::from_value(data, self.id, self.transport.clone())
    }
}

/// Build the form fields for a run request, omitting unset optionals.
pub(crate) fn run_form(
    project_id: u64,
    name: &str,
    app_value: String,
    pool: Option<&DevicePool>,
    options: Vec<(&'static str, String)>,
) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("project", project_id.to_string()),
        ("name", name.to_string()),
        ("app", app_value),
    ];
    if let Some(pool) = pool {
        fields.push(("pool", pool.id.to_string()));
    }
    fields.extend(options);
    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ThwackError;
    use crate::thwack_transport::ThwackConfig;
    use serde_json::json;

    fn project(kind_id: u64) -> Project {
        let transport = ApiTransport::new(ThwackConfig::new("secret").unwrap()).unwrap();
        Project::from_value(
            json!({
                "id": 11,
                "name": "demo",
                "url": "demo-project",
                "project_type_id": kind_id
            }),
            transport,
        )
        .unwrap()
    }

    #[test]
    fn kind_is_selected_from_one_based_type_id() {
        assert_eq!(ProjectKind::from_type_id(1), ProjectKind::Android);
        assert_eq!(ProjectKind::from_type_id(2), ProjectKind::Web);
        assert_eq!(ProjectKind::from_type_id(3), ProjectKind::Ios);
        // Absent/unknown ids fall back to Android.
        assert_eq!(ProjectKind::from_type_id(0), ProjectKind::Android);
    }

    #[test]
    fn scheduling_gate_rejects_wrong_platform() {
        let web = project(2);
        let err = web
            .ensure_schedulable("junit", &[ProjectKind::Android])
            .unwrap_err();
        match err {
            ThwackError::Validation(ValidationError::UnsupportedTestKind { test, platform }) => {
                assert_eq!(test, "junit");
                assert_eq!(platform, "web");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_form_omits_unset_optionals() {
        let fields = run_form(11, "smoke", "77".to_string(), None, vec![(
            "junit",
            "78".to_string(),
        )]);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["project", "name", "app", "junit"]);
    }

    #[test]
    fn run_form_includes_pool_when_set() {
        let pool: DevicePool =
            crate::thwack_records::decode(json!({"id": 5, "name": "Top 10"})).unwrap();
        let fields = run_form(11, "smoke", "77".to_string(), Some(&pool), Vec::new());
        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["project", "name", "app", "pool"]);
        assert_eq!(fields[3].1, "5");
    }

    #[test]
    fn project_display_uses_the_url_segment() {
        assert_eq!(project(1).to_string(), "project/demo-project");
    }
}
