use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cli::{utils, Cli, OutputFormat};
use crate::config::{ClientConfig, ClientOverrides, ServiceMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Environment-resolved client config with command-line flags on top
pub fn resolve_client_config(cli: &Cli) -> ClientConfig {
    let mode = if cli.local {
        Some(ServiceMode::Local)
    } else if cli.remote {
        Some(ServiceMode::Remote)
    } else {
        None
    };

    ClientConfig::from_env().with_overrides(ClientOverrides {
        mode,
        api_base_url: cli.api_url.clone(),
        data_dir: cli.data_dir.clone(),
        ..Default::default()
    })
}

/// The health route sits at the server root, outside the `/api` prefix
pub fn health_url(api_base_url: &str) -> String {
    let base = api_base_url.trim_end_matches('/');
    let root = base.strip_suffix("/api").unwrap_or(base);
    format!("{}/health", root)
}

pub async fn ping_server(api_base_url: &str) -> ServerStatus {
    let client = reqwest::Client::new();
    let url = health_url(api_base_url);

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if response.status().is_success() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}

pub async fn handle_status(config: &ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let status = match config.mode {
        ServiceMode::Remote => ping_server(&config.api_base_url).await,
        ServiceMode::Local => ServerStatus::Unknown,
    };

    match output_format {
        OutputFormat::Json => utils::print_json(&json!({
            "mode": config.mode,
            "api_base_url": config.api_base_url,
            "data_dir": config.data_dir,
            "simulate_network_delay_ms": config.simulate_network_delay_ms,
            "server": status,
        })),
        OutputFormat::Text => {
            println!("Mode: {:?}", config.mode);
            println!("API: {}", config.api_base_url);
            println!("Data dir: {}", config.data_dir.display());
            if config.mode == ServiceMode::Remote {
                println!("Server: {:?}", status);
            }
            Ok(())
        }
    }
}
