//! CLI tool to check a mission file before it is sent to the fleet platform.
//!
//! Validates the mission fail-closed, optionally converts a local mission to
//! global coordinates, and optionally submits a collision-validation request.

use anyhow::Context;
use clap::Parser;
use muav_cli::{load_collision_objects, load_mission, summarize, FrameArg};
use muav_client::{ClientSettings, PlatformClient};
use muav_core::{MissionValidationResult, TargetCoverage};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Validate a mission file (local or global coordinates)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Mission JSON file
    file: PathBuf,

    /// Coordinate frame of the mission file
    #[arg(long, value_enum, default_value = "local")]
    frame: FrameArg,

    /// JSON array of collision objects (obstacles and inspection targets)
    #[arg(long)]
    collision_objects: Option<PathBuf>,

    /// Reject inspection targets missing from the collision objects
    #[arg(long)]
    strict_targets: bool,

    /// Print the mission converted to global coordinates
    #[arg(long)]
    to_global: bool,

    /// Submit the collision request to the platform's /missions/validate
    #[arg(long, requires = "collision_objects")]
    submit: bool,

    /// Platform API base URL
    #[arg(long, env = "MUAV_API_URL", default_value = "https://localhost:4000/api")]
    api_url: String,

    /// Platform API token
    #[arg(long, env = "MUAV_API_TOKEN")]
    api_token: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let check = load_mission(&args.file, args.frame)?;
    print!("{}", summarize(&check.document));
    println!("Mission is valid.");

    if args.to_global {
        let global = check.to_global();
        println!("\nGlobal mission:");
        println!("{}", serde_json::to_string_pretty(&global)?);
    }

    let Some(objects_path) = &args.collision_objects else {
        return Ok(());
    };

    let objects = load_collision_objects(objects_path)?;
    let coverage = if args.strict_targets {
        TargetCoverage::Strict
    } else {
        TargetCoverage::Advisory
    };
    let assembled = check.collision_request(objects, coverage)?;
    println!(
        "\nCollision request ready: {} object(s)",
        assembled.request.collision_objects.len()
    );
    for target in &assembled.uncovered_targets {
        println!(
            "  warning: {} references '{}' which is not among the collision objects",
            target.path, target.target_id
        );
    }

    if !args.submit {
        return Ok(());
    }

    let client = PlatformClient::new(ClientSettings {
        base_url: args.api_url.clone(),
        token: args.api_token.clone().filter(|t| !t.is_empty()),
        timeout: Duration::from_millis(args.timeout_ms),
        verify_tls: !args.insecure,
    })?;

    println!("\nSubmitting to {}...", client.base_url());
    let response = client
        .post("/missions/validate", &assembled.request)
        .await
        .context("collision validation request failed")?;

    match MissionValidationResult::from_response(&response) {
        Ok(result) => {
            println!("{}", result.render());
            if !result.valid {
                std::process::exit(2);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "unexpected validation response shape");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
