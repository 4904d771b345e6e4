use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use testbed_map::config::Config;
use testbed_map::{ingest, TestbedMap};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testbed_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::load();
    tracing::info!("Starting testbed-map");
    tracing::info!("Inventory: {}", cfg.inventory_path);
    tracing::info!("Output: {}", cfg.output_path);

    let entries = ingest::load_inventory(Path::new(&cfg.inventory_path))?;
    tracing::info!("Loaded {} inventory entries", entries.len());

    let mut map = TestbedMap::new();
    ingest::build_from_inventory(&mut map, &entries)?;
    map.set_output(&cfg.output_path);
    map.save()?;

    Ok(())
}
