use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yardserver::core::config::AppConfig;
use yardserver::core::shared::state::AppState;
use yardserver::core::shared::utils::{create_conn, run_migrations};
use yardserver::directory::ZitadelClient;
use yardserver::main_module::{run_server, seed_admin, AdminSeed};
use yardserver::store::pg::PgStore;

const USAGE: &str = "usage: yardserver [serve | seed-admin <auth-id> <email> <name>]";

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging.filter);
    info!("Starting yardserver {}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();

    let pool = create_conn(&config.database).context("Failed to create database pool")?;
    let applied = run_migrations(&pool).map_err(|e| anyhow!("Migrations failed: {}", e))?;
    if !applied.is_empty() {
        info!("Applied {} migrations: {}", applied.len(), applied.join(", "));
    }
    let store = Arc::new(PgStore::new(pool));

    match args.first().map(String::as_str) {
        None | Some("serve") => {}
        Some("seed-admin") => {
            let seed = AdminSeed::from_args(&args[1..]).ok_or_else(|| anyhow!(USAGE))?;
            let user = seed_admin(store.as_ref(), &seed)?;
            println!("Administrator {} <{}> created", user.id, user.email);
            return Ok(());
        }
        Some(other) => return Err(anyhow!("Unknown command {:?}\n{}", other, USAGE)),
    }

    if !config.directory_configured() {
        warn!("Identity provider credentials are not set; supervisor management will fail");
    }
    let identity = Arc::new(
        ZitadelClient::new(config.directory.clone()).context("Failed to build identity client")?,
    );

    let state = Arc::new(AppState::new(store, identity, config));
    run_server(state).await.context("HTTP server failed")?;
    info!("Server stopped");
    Ok(())
}
