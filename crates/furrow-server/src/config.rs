use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_ADMIN_KEY: &str = "dev-admin-key-change-me";

pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub admin_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = var("FURROW_DB_PATH").unwrap_or_else(|| "furrow.db".into());
        let host = var("FURROW_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("FURROW_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("invalid port")?;

        let admin_key = match var("FURROW_ADMIN_KEY") {
            Some(key) if !key.is_empty() => key,
            _ => {
                warn!("FURROW_ADMIN_KEY not set, using the development default");
                DEFAULT_ADMIN_KEY.into()
            }
        };

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            addr,
            admin_key,
        })
    }
}
