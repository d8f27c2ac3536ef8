// src/main.rs

//! The command-line entry point: installs, starts and publishes an embedded cluster.

use anyhow::{Context, Result};
use ringforge::ClusterManager;
use ringforge::config::{DeploymentOptions, SystemProperties};
use ringforge::orchestrator::TomlFileUpdate;
use std::env;
use std::sync::Arc;
use tracing::{error, info};

/// The override key naming the external properties file that receives the host list.
const SERVER_PROPERTIES_KEY: &str = "server.properties-file";

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("ringforge version {VERSION}");
        return Ok(());
    }

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .compact()
        .with_ansi(true)
        .init();

    if let Err(e) = run_app(&args).await {
        error!("Cluster bootstrap failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_app(args: &[String]) -> Result<()> {
    let config_path = flag_value(args, "--config")?.unwrap_or("ringforge.toml");

    // Environment overrides first, so that -D definitions on the command line win.
    let mut overrides = SystemProperties::from_env();
    for arg in args.iter().filter(|a| a.starts_with("-D")) {
        match SystemProperties::parse_define(arg) {
            Some((key, value)) => overrides.set(&key, value),
            None => anyhow::bail!("Invalid property definition '{arg}', expected -Dkey=value"),
        }
    }

    let options = DeploymentOptions::from_file(config_path, &overrides)
        .with_context(|| format!("Failed to load deployment options from '{config_path}'"))?;

    let server_properties = flag_value(args, "--server-properties")?
        .map(str::to_string)
        .or_else(|| overrides.get(SERVER_PROPERTIES_KEY).map(str::to_string));

    let mut manager = ClusterManager::new(options);
    if let Some(path) = server_properties {
        info!("Cluster hosts will be published to {}", path);
        manager = manager.with_publisher(Arc::new(TomlFileUpdate::new(path)));
    }

    let hosts = manager.run().await?;
    info!("Cluster is ready: {}", hosts.join(", "));
    Ok(())
}

/// Returns the value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|arg| arg == flag) {
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .with_context(|| format!("{flag} flag requires a value")),
        None => Ok(None),
    }
}
