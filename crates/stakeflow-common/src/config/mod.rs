//! Configuration types for the stakeflow system

use {
    std::{fs, path::Path},
    serde::{Deserialize, Serialize},
};

use crate::{
    errors::{Error, Result},
    types::StakeAmount,
};

/// Chain metadata URLs may not exceed this many bytes.
pub const MAX_METADATA_URL_LEN: usize = 2048;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Share of the available balance above which staking asks for confirmation.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: u8,

    /// Smallest amount accepted for a brand-new registration.
    #[serde(default = "default_registration_floor")]
    pub registration_floor: StakeAmount,

    #[serde(default = "default_metadata_url_max_len")]
    pub metadata_url_max_len: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_warning_threshold() -> u8 {
    95
}

fn default_registration_floor() -> StakeAmount {
    StakeAmount::from_micro(1)
}

fn default_metadata_url_max_len() -> usize {
    MAX_METADATA_URL_LEN
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            warning_threshold_percent: default_warning_threshold(),
            registration_floor: default_registration_floor(),
            metadata_url_max_len: default_metadata_url_max_len(),
        }
    }
}

impl FlowConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warning_threshold_percent == 0 || self.warning_threshold_percent > 100 {
            return Err(Error::Config(format!(
                "warning_threshold_percent must be within 1..=100, got {}",
                self.warning_threshold_percent
            )));
        }
        if self.metadata_url_max_len == 0 {
            return Err(Error::Config("metadata_url_max_len must be positive".into()));
        }
        Ok(())
    }
}
