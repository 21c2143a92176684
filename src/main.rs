// src/main.rs
use tracing_subscriber::EnvFilter;

use vax_scrape::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    cli::run()?;
    Ok(())
}
