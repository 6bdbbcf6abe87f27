//! On-disk node configuration: a YAML document describing the validator set and the
//! runtime parameters to boot the state transition function with.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use jam_state::Config as StfConfig;
use jam_state::types::ValidatorDescriptor;

#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub parameters: Parameters,
    pub validators: Vec<ValidatorEntry>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Parameters {
    pub validator_count: usize,
    pub core_count: usize,
    pub epoch_length: u32,
    #[serde(default)]
    pub tiny: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorEntry {
    pub bandersnatch: String,
    pub ed25519: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading node config at {}", path.display()))?;
        serde_yaml::from_str(&text).context("parsing node config YAML")
    }

    /// Build the runtime `Config` the state transition function uses. `tiny` in the
    /// YAML selects the conformance parameter set over the literal parameters given,
    /// matching how the conformance scenarios pin their own small validator counts.
    pub fn stf_config(&self) -> StfConfig {
        if self.parameters.tiny {
            StfConfig::tiny()
        } else {
            StfConfig {
                validator_count: self.parameters.validator_count,
                core_count: self.parameters.core_count,
                epoch_length: self.parameters.epoch_length,
                ..StfConfig::default()
            }
        }
    }

    pub fn validator_descriptors(&self) -> Result<Vec<ValidatorDescriptor>> {
        self.validators
            .iter()
            .map(|entry| {
                let bandersnatch = decode_key32(&entry.bandersnatch)?;
                let ed25519 = decode_key32(&entry.ed25519)?;
                let mut descriptor = ValidatorDescriptor::zero();
                descriptor.bandersnatch = bandersnatch;
                descriptor.ed25519 = ed25519;
                Ok(descriptor)
            })
            .collect()
    }
}

fn decode_key32(hex_str: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_str.trim_start_matches("0x")).context("decoding hex key")?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("key must be exactly 32 bytes"))
}
