use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_planner::cache::{CacheConfig, CachedPlanner};
use transit_planner::config::{ServerConfig, is_zip};
use transit_planner::gtfs;
use transit_planner::network::Network;
use transit_planner::planner::QueryConfig;
use transit_planner::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    if let (Some(url), Some(feed), Some(archive)) = (
        config.gtfs_url.as_deref(),
        config.gtfs_path.as_deref(),
        config.archive_path(),
    ) {
        gtfs::download_feed(url, &archive).await?;
        if !is_zip(feed) {
            gtfs::extract_feed(&archive, feed)?;
        }
    }

    let network = load_network(&config)?;
    let stats = network.stats();
    info!(
        stops = stats.stops,
        routes = stats.routes,
        trips = stats.trips,
        "Network ready"
    );

    let planner = CachedPlanner::new(
        Arc::new(network),
        QueryConfig::new(config.max_rounds),
        &CacheConfig::default(),
    );
    let app = create_router(AppState::new(planner));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "Transit planner listening");
    info!("  GET /health                                   - Health check");
    info!("  GET /api/stops/search?q=                      - Find stops");
    info!("  GET /journey/plan?from=&to=&time=&max_rounds= - Plan a journey");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Loads the compiled snapshot when it exists and no fresh download was
/// asked for; otherwise loads the GTFS feed and writes the snapshot.
fn load_network(config: &ServerConfig) -> Result<Network, Box<dyn Error>> {
    if let Some(snapshot) = &config.snapshot
        && snapshot.is_file()
        && config.gtfs_url.is_none()
    {
        return Ok(Network::load_snapshot(snapshot)?);
    }

    let Some(feed) = &config.gtfs_path else {
        return Err("snapshot not found and no GTFS feed configured".into());
    };
    let (network, _) = gtfs::load(feed, config.service_date)?;

    if let Some(snapshot) = &config.snapshot {
        // Not fatal: the next start falls back to the feed
        if let Err(e) = network.save_snapshot(snapshot) {
            warn!(path = %snapshot.display(), error = %e, "Could not write snapshot");
        }
    }
    Ok(network)
}
