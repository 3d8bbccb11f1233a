//! Server configuration
//!
//! Parsed from command line flags with environment variable fallbacks.

use std::time::Duration;

use clap::Parser;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:3001";

/// Default room capacity when the creator does not ask for one
pub const DEFAULT_MAX_PLAYERS: usize = 8;

const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 2 * 60 * 60;
const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;
const DEFAULT_METRICS_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Parser)]
#[command(name = "room_server")]
#[command(about = "Ephemeral multiplayer room server over WebSocket", long_about = None)]
pub struct ServerConfig {
    /// Address to bind the WebSocket listener to
    #[arg(long, env = "ROOM_SERVER_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Capacity of rooms created without an explicit maxPlayers
    #[arg(long, env = "ROOM_SERVER_MAX_PLAYERS", default_value_t = DEFAULT_MAX_PLAYERS)]
    pub default_max_players: usize,

    /// Rooms without activity for this long are closed
    #[arg(long, env = "ROOM_SERVER_IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout_secs: u64,

    /// How often idle rooms are looked for
    #[arg(long, env = "ROOM_SERVER_REAP_INTERVAL_SECS", default_value_t = DEFAULT_REAP_INTERVAL_SECS)]
    pub reap_interval_secs: u64,

    /// How often operational metrics are logged
    #[arg(long, env = "ROOM_SERVER_METRICS_INTERVAL_SECS", default_value_t = DEFAULT_METRICS_INTERVAL_SECS)]
    pub metrics_interval_secs: u64,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.max(1))
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_interval_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            default_max_players: DEFAULT_MAX_PLAYERS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            reap_interval_secs: DEFAULT_REAP_INTERVAL_SECS,
            metrics_interval_secs: DEFAULT_METRICS_INTERVAL_SECS,
        }
    }
}
