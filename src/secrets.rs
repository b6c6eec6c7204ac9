//! Store credentials, kept encrypted at rest with SOPS.
//!
//! The secrets file is decrypted in memory by running the `sops` binary and
//! then parsed as YAML:
//!
//! ```yaml
//! api:
//!   token: shpat_...
//!   shop: my-shop
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Default name of the SOPS executable, looked up on `PATH`.
pub const DEFAULT_SOPS_BINARY: &str = "sops";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("failed to read secrets file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decrypt secrets file {path}: {stderr}")]
    Decrypt { path: String, stderr: String },
    #[error("failed to parse secrets file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Turns a secrets file on disk into plaintext bytes.
pub trait Decryptor {
    fn decrypt(&self, path: &Path) -> Result<Vec<u8>, SecretsError>;
}

/// Decrypts with `sops --decrypt`.
#[derive(Debug, Clone)]
pub struct SopsDecryptor {
    binary: PathBuf,
}

impl SopsDecryptor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for SopsDecryptor {
    fn default() -> Self {
        Self::new(DEFAULT_SOPS_BINARY)
    }
}

impl Decryptor for SopsDecryptor {
    fn decrypt(&self, path: &Path) -> Result<Vec<u8>, SecretsError> {
        let output = Command::new(&self.binary)
            .args(["--decrypt", "--input-type", "yaml", "--output-type", "yaml"])
            .arg(path)
            .output()
            .map_err(|source| SecretsError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SecretsError::Decrypt {
                path: path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Reads an unencrypted secrets file as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextDecryptor;

impl Decryptor for PlaintextDecryptor {
    fn decrypt(&self, path: &Path) -> Result<Vec<u8>, SecretsError> {
        std::fs::read(path).map_err(|source| SecretsError::Read {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawSecrets {
    api: RawApi,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    token: String,
    shop: String,
}

/// Store API credentials.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub token: SecretString,
    /// Store name (`my-shop`) or full domain (`my-shop.myshopify.com`).
    pub shop: String,
}

impl Secrets {
    pub fn from_yaml(bytes: &[u8], path: &Path) -> Result<Self, SecretsError> {
        let raw: RawSecrets = serde_yaml::from_slice(bytes).map_err(|source| SecretsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            token: SecretString::from(raw.api.token),
            shop: raw.api.shop,
        })
    }

    pub fn load(path: &Path, decryptor: &dyn Decryptor) -> Result<Self, SecretsError> {
        let plaintext = decryptor.decrypt(path)?;
        Self::from_yaml(&plaintext, path)
    }
}
