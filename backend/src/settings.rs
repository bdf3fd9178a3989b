//! Server settings loaded via OrthoConfig.
//!
//! Values come from command-line flags, `PASS_CULTURE_*` environment
//! variables and configuration files, in OrthoConfig's usual precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{FeatureFlags, UnknownFeature};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Where the server listens and which store it uses.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PASS_CULTURE")]
pub struct ServerSettings {
    /// Address to bind; defaults to every IPv4 interface.
    pub host: Option<IpAddr>,
    /// Port to bind; defaults to 8080.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the server keeps its data in memory.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Comma-separated origins allowed to call the API. Empty allows all.
    pub allowed_origins: Option<String>,
    /// Comma-separated feature toggles to switch off, e.g. `WEBAPP_SIGNUP`.
    pub disabled_features: Option<String>,
}

impl ServerSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Allowed origins, trimmed, without empty entries.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Feature toggles with the configured ones switched off.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFeature`] when a configured key names no toggle.
    pub fn feature_flags(&self) -> Result<FeatureFlags, UnknownFeature> {
        FeatureFlags::parse_disabled(self.disabled_features.as_deref().unwrap_or_default())
    }
}
