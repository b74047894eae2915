use std::sync::Arc;

use greenroute::{
    AppState,
    config::AppConfig,
    create_router,
    database::{Database, InMemoryTripStore, TripStore},
    planner::TripPlanner,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "greenroute=debug,tower_http=info,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("valid configuration");

    let store: Arc<dyn TripStore> = match &config.database_url {
        Some(url) => {
            let db = Database::connect(url).await.expect("connect to PostgreSQL");
            db.migrate().await.expect("run database migrations");
            tracing::info!("PostgreSQL connected successfully");
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, trips are kept in memory only");
            Arc::new(InMemoryTripStore::new())
        }
    };

    if config.providers.mapbox_access_token.is_none() {
        tracing::warn!("MAPBOX_ACCESS_TOKEN not set, every planning request will fail routing");
    }
    if config.providers.openweather_api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set, temperature defaults will be used");
    }

    let planner =
        TripPlanner::from_config(&config.providers, Arc::clone(&store)).expect("build HTTP clients");
    let state = AppState {
        planner: Arc::new(planner),
        store,
    };
    let app = create_router(state);

    let addr = config.bind_addr;
    tracing::info!("Starting GreenRoute on http://{addr}");
    tracing::info!("  POST /api/trips/plan - Plan a trip");
    tracing::info!("  GET /api/trips - List your trips");
    tracing::info!("  GET /api/trips/:id - Get one of your trips");

    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
