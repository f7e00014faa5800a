//! Runtime configuration from the environment (optionally seeded by `.env`).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::registry::DatasetKind;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Workbook path per dataset, in registry order.
    pub sources: Vec<(DatasetKind, PathBuf)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let sources = DatasetKind::ALL
            .iter()
            .map(|kind| {
                let path = lookup(kind.path_env_var())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_dir.join(kind.default_file_name()));
                (*kind, path)
            })
            .collect();

        Ok(Self {
            host,
            port,
            data_dir,
            sources,
        })
    }

    /// Listener target; HOST may be an IP literal or a hostname.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.sources.len(), 4);
        assert_eq!(
            config.sources[0],
            (DatasetKind::Personal, PathBuf::from("data/Link Triggered.xlsx"))
        );
        assert_eq!(
            config.sources[2],
            (DatasetKind::BodyShop, PathBuf::from("data/Link Triggered BP.xlsx"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("DATA_DIR", "/srv/exports"),
            ("MEAL_XLSX", "/tmp/meal.xlsx"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.sources[0].1, PathBuf::from("/srv/exports/Link Triggered.xlsx"));
        assert_eq!(config.sources[1].1, PathBuf::from("/tmp/meal.xlsx"));
        assert_eq!(config.bind_target(), ("0.0.0.0", 8080));
    }

    #[tokio::test]
    async fn test_hostname_binds() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("HOST", "localhost"), ("PORT", "0")])).unwrap();
        assert_eq!(config.bind_target(), ("localhost", 0));
        let listener = tokio::net::TcpListener::bind(config.bind_target()).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_bad_port() {
        assert!(AppConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
    }
}
