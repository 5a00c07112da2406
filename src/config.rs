//! Configuration manager.

use std::fs::File;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::Deserialize;

use crate::AppState;
use crate::directory::IdentityRecord;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_NAME: &str = "Art Luxury Bus API - Real Users";
const DEFAULT_PORT: u16 = 8001;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that may occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to deserialize `{path}`: {source}")]
    Deserialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Message returned by `GET /api/ping`.
    pub name: String,
    /// Interface to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Expose Prometheus metrics on `/metrics`.
    pub metrics: bool,
    /// Known identities. The built-in directory is used when absent.
    pub identities: Option<Vec<IdentityRecord>>,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            metrics: false,
            identities: None,
            version: VERSION.to_owned(),
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    /// Set the file read by [`Configuration::read`].
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Override the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable the `/metrics` route.
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Replace the identity directory.
    pub fn identities(mut self, records: Vec<IdentityRecord>) -> Self {
        self.identities = Some(records);
        self
    }

    /// Crate version, reported by `GET /api/ping`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Address the server listens on.
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Reads the YAML file at the configured path.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn read(self) -> Result<Self, Error> {
        let file_path = if self.path.as_os_str().is_empty() {
            Path::new(DEFAULT_CONFIG_PATH)
        } else {
            self.path.as_path()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration = serde_yaml::from_reader(file)
                    .map_err(|source| Error::Deserialize {
                        path: file_path.to_path_buf(),
                        source,
                    })?;

                // set app version.
                config.version = VERSION.to_owned();
                config.path = file_path.to_path_buf();

                Ok(config)
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    path = %file_path.display(),
                    "configuration file not found, using defaults"
                );
                Ok(self)
            },
        }
    }
}
