use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use greenroute::{config::AppConfig, database::InMemoryTripStore, planner::TripPlanner};
use greenroute_shared::TripRequestPayload;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Plan one EV trip against the configured providers and print the response JSON"
)]
struct Args {
    /// JSON file holding a planning request body
    #[arg(long)]
    request: PathBuf,

    /// User id the trip is recorded for (kept in memory only)
    #[arg(long, default_value_t = 1)]
    user_id: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let body = std::fs::read_to_string(&args.request)?;
    let payload: TripRequestPayload = serde_json::from_str(&body)?;
    tracing::info!("planning trip from {:?} for user {}", args.request, args.user_id);

    let planner = TripPlanner::from_config(&config.providers, Arc::new(InMemoryTripStore::new()))?;
    let plan = planner.plan(args.user_id, payload).await?;

    println!("{}", serde_json::to_string_pretty(&plan.into_response())?);
    Ok(())
}
