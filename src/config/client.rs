use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Which transport the client services execute against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// Simulated store persisted through a `KeyValueStore`
    Local,
    /// Real backend over HTTP
    Remote,
}

/// Client-side settings, resolved once and handed to `ServiceFactory`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub mode: ServiceMode,
    pub api_base_url: String,
    pub simulate_network_delay_ms: u64,
    pub data_dir: PathBuf,
}

/// Field-wise overrides applied on top of a resolved config
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub mode: Option<ServiceMode>,
    pub api_base_url: Option<String>,
    pub simulate_network_delay_ms: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let preset = match env::var("TENDERS_CLIENT_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::production(),
            Ok("test") => Self::test(),
            _ => Self::development(),
        };
        preset.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TENDERS_USE_BACKEND") {
            if let Ok(use_backend) = v.parse::<bool>() {
                self.mode = if use_backend { ServiceMode::Remote } else { ServiceMode::Local };
            }
        }
        if let Ok(v) = env::var("TENDERS_API_URL") {
            if !v.trim().is_empty() {
                self.api_base_url = v;
            }
        }
        if let Ok(v) = env::var("TENDERS_NETWORK_DELAY_MS") {
            self.simulate_network_delay_ms = v.parse().unwrap_or(self.simulate_network_delay_ms);
        }
        if let Ok(v) = env::var("TENDERS_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        self
    }

    /// Returns a copy with the given fields replaced
    pub fn with_overrides(&self, overrides: ClientOverrides) -> Self {
        let mut next = self.clone();
        if let Some(mode) = overrides.mode {
            next.mode = mode;
        }
        if let Some(url) = overrides.api_base_url {
            next.api_base_url = url;
        }
        if let Some(delay) = overrides.simulate_network_delay_ms {
            next.simulate_network_delay_ms = delay;
        }
        if let Some(dir) = overrides.data_dir {
            next.data_dir = dir;
        }
        tracing::debug!("client config updated: {:?}", next);
        next
    }

    pub fn use_backend(&self) -> bool {
        self.mode == ServiceMode::Remote
    }

    fn development() -> Self {
        Self {
            mode: ServiceMode::Remote,
            api_base_url: "http://localhost:3000/api".to_string(),
            simulate_network_delay_ms: 0,
            data_dir: default_data_dir(),
        }
    }

    fn production() -> Self {
        Self {
            mode: ServiceMode::Remote,
            api_base_url: "https://tenders.example.com/api".to_string(),
            simulate_network_delay_ms: 0,
            data_dir: default_data_dir(),
        }
    }

    fn test() -> Self {
        Self {
            mode: ServiceMode::Local,
            api_base_url: "http://localhost:8000/api".to_string(),
            simulate_network_delay_ms: 0,
            data_dir: env::temp_dir().join("tenders-test"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("tenders"),
        Err(_) => PathBuf::from(".tenders"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let base = ClientConfig::development();
        let next = base.with_overrides(ClientOverrides {
            mode: Some(ServiceMode::Local),
            ..Default::default()
        });

        assert_eq!(next.mode, ServiceMode::Local);
        assert!(!next.use_backend());
        assert_eq!(next.api_base_url, base.api_base_url);
        assert_eq!(base.mode, ServiceMode::Remote, "original config must be untouched");
    }

    #[test]
    fn test_preset_runs_locally() {
        let config = ClientConfig::test();
        assert_eq!(config.mode, ServiceMode::Local);
        assert_eq!(config.simulate_network_delay_ms, 0);
    }
}
