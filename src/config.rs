use std::path::PathBuf;

use anyhow::{bail, Context};

use crate::store::json::DEFAULT_FILE_NAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    File(PathBuf),
    Memory,
}

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub store: StoreBackend,
    pub serialize_writes: bool,
    pub enforce_password_policy: bool,
    pub frontend_dir: Option<PathBuf>,
    pub allowed_origins: Vec<String>,
    pub enable_hsts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 3000,
            store: StoreBackend::File(PathBuf::from(DEFAULT_FILE_NAME)),
            serialize_writes: true,
            enforce_password_policy: false,
            frontend_dir: None,
            allowed_origins: Vec::new(),
            enable_hsts: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flag = |name: &str, default: bool| -> anyhow::Result<bool> {
            match var(name) {
                Some(v) => parse_bool(&v).with_context(|| format!("invalid value for {name}")),
                None => Ok(default),
            }
        };
        let d = Self::default();

        let port = match var("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid value for PORT: '{v}'"))?,
            None => d.port,
        };

        let store = match var("ROSTER_STORE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("file") => {
                let path = match (var("ROSTER_USERS_FILE"), var("ROSTER_DATA_DIR")) {
                    (Some(file), _) => PathBuf::from(file),
                    (None, Some(dir)) => PathBuf::from(dir).join(DEFAULT_FILE_NAME),
                    (None, None) => PathBuf::from(DEFAULT_FILE_NAME),
                };
                StoreBackend::File(path)
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                bail!("invalid value for ROSTER_STORE: '{other}' (expected 'file' or 'memory')")
            }
        };

        Ok(Self {
            bind_addr: var("ROSTER_BIND_ADDR").unwrap_or(d.bind_addr),
            port,
            store,
            serialize_writes: flag("ROSTER_SERIALIZE_WRITES", d.serialize_writes)?,
            enforce_password_policy: flag("ROSTER_PASSWORD_POLICY", d.enforce_password_policy)?,
            frontend_dir: var("ROSTER_FRONTEND_DIR").map(PathBuf::from),
            allowed_origins: var("ROSTER_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            enable_hsts: flag("ENABLE_HSTS", d.enable_hsts)?,
        })
    }
}

fn parse_bool(v: &str) -> anyhow::Result<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("'{v}' is not a boolean"),
    }
}

// comma-separated, blanks dropped
fn split_list(v: &str) -> Vec<String> {
    v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
