//! Thwack Client - AppThwack REST API library.
//!
//! A client library for the AppThwack cloud device testing service:
//! - **Projects**: list projects and look them up by id or name
//! - **Device pools**: enumerate the device sets a project can run on
//! - **Uploads**: push app binaries and test archives
//! - **Runs**: schedule platform-specific test runs, poll status, fetch
//!   results, and download the results archive
//!
//! ## Quick Start
//!
//! Configuration is loaded from environment variables. Create a `.env`
//! file:
//!
//! ```text
//! APPTHWACK_API_KEY=your_api_key_here
//! ```
//!
//! Then drive the API from a tokio context:
//!
//! ```ignore
//! use thwack_client::ThwackApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ThwackApi::from_env()?;
//!
//!     let app = api.upload("app-debug.apk".as_ref(), None).await?;
//!     let project = api.project_by_name("my-project").await?.expect("project");
//!     let pool = project.device_pool_by_name("Top 10 devices").await?;
//!
//!     let run = project
//!         .schedule_app_explorer_run(&app, "smoke", pool.as_ref(), &Default::default())
//!         .await?;
//!     println!("scheduled: {run} -> {}", run.status().await?);
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::redundant_clone)]     // Useless clones warning

// ============================================================================
// Modules
// ============================================================================

/// Error types shared across the crate.
pub mod error;

/// HTTP transport: URL building, auth, response validation.
///
/// Use this module to configure the client (API key, domain, timeouts).
pub mod thwack_transport;

/// Typed records decoded from API payloads.
///
/// Use this module for the value-like records: device pools, uploaded
/// files, run results.
pub mod thwack_records;

/// Projects and platform-specific run scheduling.
pub mod thwack_project;

/// Run lifecycle: status, results, cancellation, archive download.
pub mod thwack_run;

/// Top-level API client.
pub mod thwack_api;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{ApiError, Result, ThwackError, ValidationError};
pub use thwack_api::ThwackApi;
pub use thwack_project::{AppExplorerOptions, Project, ProjectKind};
pub use thwack_records::{AppFile, DevicePool, RunResult, RunSummary};
pub use thwack_run::Run;
pub use thwack_transport::{ApiTransport, ThwackConfig};
