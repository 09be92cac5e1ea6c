//! `clipforge <job.json>`: run one job and print its result as JSON.

use anyhow::{anyhow, Context};
use tracing::{error, info};

use clipforge_assets::asset_service_from_env;
use clipforge_cli::{init_tracing, Job, JobRunner};
use clipforge_media::Compositor;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        error!("Job failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: clipforge <job.json>"))?;
    let job = Job::load(&path).await?;
    info!(job_file = %path, kind = job.kind(), "Loaded job");

    let mut runner = JobRunner::new(Compositor::from_env());
    if job.needs_assets() {
        let assets = asset_service_from_env().context("failed to set up the asset gateway")?;
        runner = runner.with_assets(assets);
    }

    let outcome = runner.run(job).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
