//! Server configuration loaded from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:6574";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket server listens on
    pub bind_addr: SocketAddr,
    /// Seed for the shared RNG (None = seeded from the OS)
    pub rng_seed: Option<u64>,
    /// Snapshot file restored at startup and written on shutdown
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rng_seed: None,
            snapshot_path: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 6574))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ServerConfig {
    /// Load config from BINGO_BIND_ADDR, BINGO_RNG_SEED and BINGO_SNAPSHOT_PATH.
    /// Unparseable values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        let bind_addr = match non_empty_var("BINGO_BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid BINGO_BIND_ADDR '{}': {}. Using {}",
                    raw,
                    e,
                    DEFAULT_BIND_ADDR
                );
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let rng_seed = non_empty_var("BINGO_RNG_SEED").and_then(|raw| match raw.parse::<u64>() {
            Ok(seed) => {
                tracing::info!("Using fixed RNG seed {}", seed);
                Some(seed)
            }
            Err(e) => {
                tracing::warn!("Invalid BINGO_RNG_SEED '{}': {}. Seeding from OS", raw, e);
                None
            }
        });

        let snapshot_path = non_empty_var("BINGO_SNAPSHOT_PATH").map(PathBuf::from);

        Self {
            bind_addr,
            rng_seed,
            snapshot_path,
        }
    }
}
