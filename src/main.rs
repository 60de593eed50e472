//! Example binary demonstrating the thwack_client library.
//!
//! Lists the account's projects with their platform kinds and device
//! pools, and shows the status of a run when one is named.
//!
//! ## Usage
//!
//! 1. Create a `.env` file with `APPTHWACK_API_KEY`
//! 2. Run: `cargo run`
//!
//! Optional: set `APPTHWACK_DEMO_PROJECT_ID` and `APPTHWACK_DEMO_RUN_ID`
//! to also poll a run's status.

#![allow(clippy::print_stdout)] // Allow println! in the binary example

use thwack_client::ThwackApi;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Load configuration from environment
    let api = ThwackApi::from_env()?;

    println!("Projects:");
    let projects = api.projects().await?;
    for project in &projects {
        println!("  [{}] {} ({})", project.id, project.name, project.kind);

        let pools = project.device_pools().await?;
        for pool in &pools {
            println!("      pool [{}] {}", pool.id, pool.name);
        }
    }

    // Optionally poll a known run.
    if let (Ok(project_id), Ok(run_id)) = (
        std::env::var("APPTHWACK_DEMO_PROJECT_ID"),
        std::env::var("APPTHWACK_DEMO_RUN_ID"),
    ) {
        let project_id: u64 = project_id.parse()?;
        let run_id: u64 = run_id.parse()?;
        if let Some(project) = api.project_by_id(project_id).await? {
            let run = project.run(run_id);
            println!("\n{} status: {}", run, run.status().await?);
        }
    }

    Ok(())
}
