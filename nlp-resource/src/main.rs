//! nlp-resource - load the configured model resources and hold them
//!
//! Loads every resource named in the configuration, keeps them resident
//! until Ctrl-C, then releases them in teardown order.

use anyhow::{bail, Context, Result};
use nlp_resource::{init_tracing, DylibSuite, ResourceConfig, ResourceManager};
use std::path::PathBuf;
use tracing::info;

fn print_help() {
    println!("nlp-resource - NLP model resource manager v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("  nlp-resource [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -c, --config <FILE>  Resource configuration (JSON, default: ltp.json)");
    println!("  -h, --help           Print this help message");
    println!("  -v, --version        Print version information");
    println!();
    println!("Set RUST_LOG to control log verbosity.");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut config_path = PathBuf::from("ltp.json");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("nlp-resource {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "-c" | "--config" => match args.next() {
                Some(path) => config_path = PathBuf::from(path),
                None => bail!("'{}' requires a file argument", arg),
            },
            _ => {
                eprintln!("error: unrecognized argument '{}'", arg);
                eprintln!("Run 'nlp-resource --help' for usage information.");
                std::process::exit(1);
            }
        }
    }

    init_tracing()?;

    let config = ResourceConfig::from_file(&config_path)?;
    let engines = DylibSuite::open(&config.libraries).context("Failed to open engine libraries")?;
    let mut manager = ResourceManager::new(engines);

    let loaded = manager
        .load_from_config(&config)
        .context("Failed to load configured resources")?;
    info!("Resources ready: {:?}", loaded);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down, releasing resources");
    drop(manager);
    Ok(())
}
