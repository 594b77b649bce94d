//! Snapfeed server binary.

use snapfeed_services::{
    config::Config,
    database::{self, PgStorage},
    routes,
    storage::{LocalDisk, OpenDALDisk as _},
    telemetry,
};
use std::net::{IpAddr, SocketAddr};
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const BUILD_DATE: &str = env!("BUILD_DATE");
const BUILD_COMMIT: &str = env!("BUILD_COMMIT");
const BUILD_BRANCH: &str = env!("BUILD_BRANCH");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development keeps DATABASE_URL and friends in .env
    dotenvy::dotenv().ok();

    let config = Config::init()?;

    telemetry::init_tracing(&config)?;

    print_build_info();

    info!(
        environment = %config.environment(),
        server_addr = %config.server_addr(),
        port = %config.port(),
        upload_dir = %config.upload_dir().display(),
        max_upload_size_bytes = config.max_upload_size_bytes(),
        "Configuration loaded"
    );

    let pool = database::create_pool(&config).await?;
    database::run_migrations(&pool).await?;

    let disk = LocalDisk::new(config.upload_dir())?;
    disk.ensure_root().await?;
    if !disk.could_connected().await {
        anyhow::bail!("upload directory {} is not usable", disk.root().display());
    }

    let route = routes(PgStorage::new(pool), disk, config.clone()).await;

    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));

    info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, route).await?;

    Ok(())
}

fn print_build_info() {
    info!("===========================================");
    info!("  Snapfeed Services");
    info!("===========================================");
    info!("Build Date:   {}", BUILD_DATE);
    info!("Build Commit: {}", BUILD_COMMIT);
    info!("Build Branch: {}", BUILD_BRANCH);
    info!("===========================================");
}
