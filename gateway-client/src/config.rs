use crate::event_handler::{EventHandlerOptions, EventStrategy, DEFAULT_COMMIT_TIMEOUT};
use crate::network::{Identity, NetworkOptions};
use crate::query_handler::QueryStrategy;

use std::env::current_exe;
use std::fs::read_to_string;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub channel: String,
    pub msp_id: String,
    /// Serialized identity of the submitter, as the network knows it.
    pub creator: String,
    pub orderer_addr: SocketAddr,
    pub peers: Vec<PeerConfig>,
    #[serde(
        default = "default_commit_timeout",
        deserialize_with = "parse_milliseconds",
        serialize_with = "serialize_milliseconds",
        rename = "commit_timeout_ms"
    )]
    pub commit_timeout: Duration,
    #[serde(default)]
    pub event_strategy: EventStrategy,
    #[serde(default)]
    pub query_strategy: QueryStrategy,
    #[serde(default = "default_request_retries")]
    pub request_retries: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerConfig {
    pub name: String,
    pub msp_id: String,
    pub addr: SocketAddr,
    pub event_addr: SocketAddr,
}

impl Config {
    pub fn new() -> Result<Self> {
        let current_exe = current_exe()?;
        let config_path = current_exe
            .parent()
            .ok_or_else(|| anyhow!("cannot locate the executable's directory"))?
            .join("client_config.yaml");
        Self::from_path(config_path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().is_file() {
            return Err(anyhow!("config file not found, or not a file"));
        }
        let config_str = read_to_string(path.as_ref())?;
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let config = serde_yaml::from_str::<Config>(config_str)?;
        if config.peers.is_empty() {
            return Err(anyhow!("config lists no peers"));
        }
        Ok(config)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            msp_id: self.msp_id.clone(),
            creator: self.creator.as_bytes().to_vec(),
        }
    }

    pub fn network_options(&self) -> NetworkOptions {
        NetworkOptions {
            event_handler_options: EventHandlerOptions {
                commit_timeout: self.commit_timeout,
                strategy: self.event_strategy,
            },
            query_strategy: self.query_strategy,
        }
    }
}

fn default_commit_timeout() -> Duration {
    DEFAULT_COMMIT_TIMEOUT
}

fn default_request_retries() -> u32 {
    3
}

fn parse_milliseconds<'de, D>(d: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millisecs: u64 = Deserialize::deserialize(d)?;
    Ok(Duration::from_millis(millisecs))
}

fn serialize_milliseconds<S>(duration: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(duration.as_millis() as u64)
}
