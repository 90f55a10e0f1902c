//! [`ServerConfig`]: host/port/paths plus the optional-flag toggles
//! spec.md 6.6 names (HA mode, auth, MCP, pub/sub), loaded the way
//! `forge_tooling::config::ConfigBuilder` documents — environment
//! variables with a prefix, merged over defaults.

use forge_tooling::config::{get_env_bool, get_env_or, get_env_parse_or, ConfigBuilder};
use forge_tooling::Result;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the MCP WebSocket endpoint listens on (spec.md 6.1, default `/operator`).
    pub mcp_path: String,
    /// Toggles whether the session core's bearer/cookie auth is enforced
    /// on the MCP upgrade, or every connection is accepted unauthenticated.
    pub auth_enabled: bool,
    /// Toggles whether the MCP endpoint is mounted at all.
    pub mcp_enabled: bool,
    /// Toggles whether pub/sub lifecycle events are published; when off
    /// the job service and engine still run, they just don't publish.
    pub pubsub_enabled: bool,
    /// HA mode: shared cache on. This crate only ships an in-process
    /// `InMemoryKvStore`, so HA mode here only changes the L1 LRU size
    /// used by the write-through cache and session core, matching the
    /// spirit of "shared cache" without a real distributed backend.
    pub ha_mode: bool,
    /// How often, in seconds, the checkpoint cleanup timer runs.
    pub checkpoint_cleanup_interval_secs: u64,
    /// Checkpoint TTL in seconds passed to `cleanup` on each tick
    /// (spec.md 6.2: 24h TTL on checkpoint entries).
    pub checkpoint_max_age_secs: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            mcp_path: "/operator".to_string(),
            auth_enabled: true,
            mcp_enabled: true,
            pubsub_enabled: true,
            ha_mode: false,
            checkpoint_cleanup_interval_secs: 3600,
            checkpoint_max_age_secs: 24 * 60 * 60,
        }
    }
}

impl ConfigBuilder for ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(forge_tooling::ToolingError::General(
                "FORGE_PORT must be non-zero".to_string(),
            ));
        }
        if self.mcp_path.is_empty() || !self.mcp_path.starts_with('/') {
            return Err(forge_tooling::ToolingError::General(
                "FORGE_MCP_PATH must start with '/'".to_string(),
            ));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: get_env_or(&format!("{prefix}HOST"), defaults.host)?,
            port: get_env_parse_or(&format!("{prefix}PORT"), defaults.port)?,
            mcp_path: get_env_or(&format!("{prefix}MCP_PATH"), defaults.mcp_path)?,
            auth_enabled: get_env_bool(&format!("{prefix}AUTH_ENABLED"))?.unwrap_or(defaults.auth_enabled),
            mcp_enabled: get_env_bool(&format!("{prefix}MCP_ENABLED"))?.unwrap_or(defaults.mcp_enabled),
            pubsub_enabled: get_env_bool(&format!("{prefix}PUBSUB_ENABLED"))?
                .unwrap_or(defaults.pubsub_enabled),
            ha_mode: get_env_bool(&format!("{prefix}HA_MODE"))?.unwrap_or(defaults.ha_mode),
            checkpoint_cleanup_interval_secs: get_env_parse_or(
                &format!("{prefix}CHECKPOINT_CLEANUP_INTERVAL_SECS"),
                defaults.checkpoint_cleanup_interval_secs,
            )?,
            checkpoint_max_age_secs: get_env_parse_or(
                &format!("{prefix}CHECKPOINT_MAX_AGE_SECS"),
                defaults.checkpoint_max_age_secs,
            )?,
        })
    }

    fn merge(&mut self, other: Self) -> &mut Self {
        *self = other;
        self
    }
}
