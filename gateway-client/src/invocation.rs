use crate::args::Argument;
use gateway_common::TransientMap;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use serde_yaml::Value;

/// A chaincode call described in YAML, as the command line takes it.
///
/// Arguments stay untyped here so that non-string values reach the
/// argument check and get reported instead of being coerced.
#[derive(Debug, Deserialize)]
pub struct Invocation {
    pub chaincode: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub transient: BTreeMap<String, String>,
}

impl Invocation {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let invocation_str = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&invocation_str)?)
    }

    pub fn arguments(&self) -> Vec<Argument> {
        self.args.iter().cloned().map(Argument::from).collect()
    }

    pub fn transient_map(&self) -> Option<TransientMap> {
        if self.transient.is_empty() {
            return None;
        }
        Some(
            self.transient
                .iter()
                .map(|(key, value)| (key.clone(), value.as_bytes().to_vec()))
                .collect(),
        )
    }
}
