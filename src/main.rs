use anyhow::Context;
use serde::Serialize;

use rust_toolcrib::audit::AuditFilter;
use rust_toolcrib::config::Config;
use rust_toolcrib::db::create_pool;
use rust_toolcrib::services::{AuditReport, AuditService, DashboardReport};
use rust_toolcrib::storage::{InventoryStore, PgInventoryStore, SnapshotStore};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Serialize)]
struct Output {
    dashboard: DashboardReport,
    audit: AuditReport,
}

async fn run<S: InventoryStore>(store: S, filter: &AuditFilter) -> anyhow::Result<Output> {
    let service = AuditService::new(store);
    let dashboard = service
        .dashboard(RECENT_ACTIVITY_LIMIT)
        .await
        .context("Failed to build dashboard")?;
    let audit = service
        .audit_log(filter)
        .await
        .context("Failed to build audit log")?;
    Ok(Output { dashboard, audit })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stdout is reserved for the report)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_toolcrib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let filter = config.audit_filter().context("Invalid audit filter")?;

    tracing::info!("Starting rust-toolcrib audit...");

    let output = if let Some(database_url) = &config.database_url {
        tracing::info!("Connecting to database...");
        let pool = create_pool(database_url, config.database_max_connections)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Database connection established");
        run(PgInventoryStore::new(pool), &filter).await?
    } else if let Some(path) = &config.snapshot_path {
        tracing::info!("Using snapshot: {}", path.display());
        let store = SnapshotStore::load(path)
            .await
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        run(store, &filter).await?
    } else {
        anyhow::bail!("either DATABASE_URL or SNAPSHOT_PATH must be set");
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
