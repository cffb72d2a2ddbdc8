use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    /// Base of the URLs handed out for uploaded blobs.
    pub public_url: String,
}

impl Config {
    /// Reads `CRIB_*` variables. A port given as the first argument wins
    /// over `CRIB_PORT`.
    pub fn load() -> anyhow::Result<Self> {
        let mut port = try_load("CRIB_PORT", 8000u16);
        if let Some(arg) = env::args().nth(1) {
            port = arg
                .parse()
                .with_context(|| format!("invalid port argument {arg:?}"))?;
        }
        let db_path = PathBuf::from(try_load("CRIB_DB_PATH", String::from("crib-db")));
        let public_url = try_load("CRIB_PUBLIC_URL", format!("http://localhost:{port}"));
        Ok(Self {
            port,
            db_path,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
