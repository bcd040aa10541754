//! Server Configuration

use std::str::FromStr;

use wealth_engine::ReconcilerConfig;

use crate::state::DEFAULT_MAX_WORKSPACES;

/// Which market data backend feeds the reconciler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceSourceKind {
    CoinGecko,
    Ollama,
    Offline,
}

impl FromStr for PriceSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coingecko" => Ok(Self::CoinGecko),
            "ollama" | "ai" => Ok(Self::Ollama),
            "offline" | "none" => Ok(Self::Offline),
            other => Err(format!("unknown price source '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub price_source: PriceSourceKind,

    /// Give new users the demo portfolio
    pub seed_demo_assets: bool,

    /// Upper bound on per-user workspaces kept in memory
    pub max_workspaces: usize,

    pub reconciler: ReconcilerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            price_source: PriceSourceKind::CoinGecko,
            seed_demo_assets: false,
            max_workspaces: DEFAULT_MAX_WORKSPACES,
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let price_source = match std::env::var("PRICE_SOURCE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("{e}, using CoinGecko");
                PriceSourceKind::CoinGecko
            }),
            Err(_) => defaults.price_source,
        };
        let seed_demo_assets = std::env::var("SEED_DEMO_ASSETS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.seed_demo_assets);
        let max_workspaces = std::env::var("MAX_WORKSPACES")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_workspaces);

        Self {
            bind_addr,
            price_source,
            seed_demo_assets,
            max_workspaces,
            reconciler: ReconcilerConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_source_parsing() {
        assert_eq!("CoinGecko".parse::<PriceSourceKind>().unwrap(), PriceSourceKind::CoinGecko);
        assert_eq!("ollama".parse::<PriceSourceKind>().unwrap(), PriceSourceKind::Ollama);
        assert_eq!(" offline ".parse::<PriceSourceKind>().unwrap(), PriceSourceKind::Offline);
        assert!("bloomberg".parse::<PriceSourceKind>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(!config.seed_demo_assets);
        assert_eq!(config.max_workspaces, DEFAULT_MAX_WORKSPACES);
    }
}
