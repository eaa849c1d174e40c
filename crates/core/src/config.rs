use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TierError};

/// One of the three tiers in the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
    C,
}

impl Role {
    /// Maps a service name onto a tier. Names other than `service-a` and
    /// `service-b` select tier C.
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "service-a" => Self::A,
            "service-b" => Self::B,
            _ => Self::C,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub service_name: String,
    pub otel_service_name: String,
    pub service_a_port: u16,
    pub service_b_port: u16,
    pub service_c_port: u16,
    pub otlp_endpoint: String,
    pub bind_host: String,
    pub downstream_host: String,
    #[serde(with = "duration_text")]
    pub latency_min: Duration,
    #[serde(with = "duration_text")]
    pub latency_max: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "service-a".to_string(),
            otel_service_name: "tierchain".to_string(),
            service_a_port: 3000,
            service_b_port: 3001,
            service_c_port: 3002,
            otlp_endpoint: "http://localhost:4317".to_string(),
            bind_host: "0.0.0.0".to_string(),
            downstream_host: "localhost".to_string(),
            latency_min: Duration::from_millis(100),
            latency_max: Duration::from_millis(2000),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides(|key| env::var(key).ok())?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.latency_min >= self.latency_max {
            return Err(TierError::Config(format!(
                "latency_min ({}) must be below latency_max ({})",
                humantime::format_duration(self.latency_min),
                humantime::format_duration(self.latency_max)
            )));
        }
        Ok(())
    }

    pub fn role(&self) -> Role {
        Role::from_service_name(&self.service_name)
    }

    pub fn port_for(&self, role: Role) -> u16 {
        match role {
            Role::A => self.service_a_port,
            Role::B => self.service_b_port,
            Role::C => self.service_c_port,
        }
    }

    /// Port this process binds, chosen by its own role.
    pub fn listen_port(&self) -> u16 {
        self.port_for(self.role())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.listen_port())
    }

    /// Address of `path` on another tier of the chain.
    pub fn downstream_url(&self, role: Role, path: &str) -> String {
        format!(
            "http://{}:{}{}",
            self.downstream_host,
            self.port_for(role),
            path
        )
    }
}

mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    service_name: Option<String>,
    otel_service_name: Option<String>,
    service_a_port: Option<u16>,
    service_b_port: Option<u16>,
    service_c_port: Option<u16>,
    otlp_endpoint: Option<String>,
    bind_host: Option<String>,
    downstream_host: Option<String>,
    latency_min: Option<String>,
    latency_max: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TIERCHAIN_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("tierchain/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| TierError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| TierError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides<F>(lookup: F) -> Result<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(ConfigOverrides {
        service_name: lookup("SERVICE_NAME"),
        otel_service_name: lookup("OTEL_SERVICE_NAME"),
        service_a_port: parse_port(&lookup, "SERVICE_A_PORT")?,
        service_b_port: parse_port(&lookup, "SERVICE_B_PORT")?,
        service_c_port: parse_port(&lookup, "SERVICE_C_PORT")?,
        otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT"),
        bind_host: lookup("TIERCHAIN_BIND_HOST"),
        downstream_host: lookup("TIERCHAIN_DOWNSTREAM_HOST"),
        latency_min: lookup("TIERCHAIN_LATENCY_MIN"),
        latency_max: lookup("TIERCHAIN_LATENCY_MAX"),
    })
}

fn parse_port<F>(lookup: &F, key: &str) -> Result<Option<u16>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|e| TierError::Config(format!("bad {key} in environment: {e} (value={v})"))),
        None => Ok(None),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.service_name {
        cfg.service_name = v;
    }
    if let Some(v) = overrides.otel_service_name {
        cfg.otel_service_name = v;
    }
    if let Some(v) = overrides.service_a_port {
        cfg.service_a_port = v;
    }
    if let Some(v) = overrides.service_b_port {
        cfg.service_b_port = v;
    }
    if let Some(v) = overrides.service_c_port {
        cfg.service_c_port = v;
    }
    if let Some(v) = overrides.otlp_endpoint {
        cfg.otlp_endpoint = v;
    }
    if let Some(v) = overrides.bind_host {
        cfg.bind_host = v;
    }
    if let Some(v) = overrides.downstream_host {
        cfg.downstream_host = v;
    }
    if let Some(v) = overrides.latency_min {
        cfg.latency_min = humantime::parse_duration(&v).map_err(|e| {
            TierError::Config(format!("bad latency_min in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.latency_max {
        cfg.latency_max = humantime::parse_duration(&v).map_err(|e| {
            TierError::Config(format!("bad latency_max in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}
