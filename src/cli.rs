//! Command line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{default_config_path, default_secrets_path, ConfigError};
use crate::secrets::DEFAULT_SOPS_BINARY;
use crate::shop::DEFAULT_API_VERSION;

/// Fetch a recent store order and print it as a packing slip label.
#[derive(Debug, Clone, Parser)]
#[command(name = "packingslipper", version, about)]
pub struct Cli {
    /// Output PDF filename
    #[arg(long = "outfile", default_value = "packingslip.pdf")]
    pub out_filename: PathBuf,

    /// Offset from most recent order to retrieve
    #[arg(long = "offset", default_value_t = 0)]
    pub order_offset: usize,

    /// Configuration YAML file (default: ~/.config/packingslipper/configuration.yaml)
    #[arg(long = "config")]
    pub config_filename: Option<PathBuf>,

    /// Encrypted secrets YAML file (default: ~/.config/packingslipper/secrets.enc.yaml)
    #[arg(long = "secrets")]
    pub secrets_filename: Option<PathBuf>,

    /// Display extra information while running
    #[arg(long)]
    pub verbose: bool,

    /// Store Admin API version
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// sops executable used to decrypt the secrets file
    #[arg(long, env = "SOPS_BINARY", default_value = DEFAULT_SOPS_BINARY)]
    pub sops_binary: PathBuf,

    /// Read the secrets file without decrypting it
    #[arg(long)]
    pub plaintext_secrets: bool,

    /// Also write the computed label layout as JSON to this path
    #[arg(long)]
    pub layout_json: Option<PathBuf>,
}

impl Cli {
    /// Config file path, falling back to the per-user default.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config_filename {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    /// Secrets file path, falling back to the per-user default.
    pub fn secrets_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.secrets_filename {
            Some(path) => Ok(path.clone()),
            None => default_secrets_path(),
        }
    }
}
