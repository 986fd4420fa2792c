mod codec;
mod config;
mod seed;
mod server;


use clap::Parser;
use config::Config;
use dyntab_core::Catalog;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG: &str = "dyntab.toml";

#[derive(Debug, Parser)]
#[command(name = "dyntab-server", about = "In-memory dynamic table store over HTTP")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: String,
    /// Overrides `server.listen_addr`.
    #[arg(long)]
    listen: Option<String>,
    /// Seeds the demonstration table regardless of configuration.
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::new();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let mut config = if args.config == DEFAULT_CONFIG && !Path::new(DEFAULT_CONFIG).exists() {
        info!("no {DEFAULT_CONFIG} found, using defaults");
        Config::default()
    } else {
        Config::from_path(&args.config)?
    };
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
        config.validate()?;
    }
    if args.seed_demo {
        config.seed.demo_table = true;
    }

    let catalog = Arc::new(Catalog::new());
    if config.seed.demo_table {
        seed::seed_demo_table(&catalog)?;
        info!("seeded demonstration table {}", seed::DEMO_TABLE);
    }
    server::run(config, catalog).await?;
    Ok(())
}
