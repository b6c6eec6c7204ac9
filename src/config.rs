//! Label configuration loaded from a plaintext YAML file.
//!
//! ```yaml
//! logo:
//!   filename: /home/me/.config/packingslipper/logo.png
//!   vertical-space: 10
//! text:
//!   salutation: "Thanks for your order!"
//!   signature: "- The Shop"
//!   vertical-space: 120
//! # optional
//! fonts:
//!   regular: /usr/share/fonts/truetype/arialrounded.ttf
//!   bold: /usr/share/fonts/truetype/arialroundedbold.ttf
//! page:
//!   margin-left: 0
//!   margin-right: 0
//! ```

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::label::PAGE_WIDTH_PT;
use crate::writer::Margins;

const APP_DIR: &str = "packingslipper";
const CONFIG_FILE: &str = "configuration.yaml";
const SECRETS_FILE: &str = "secrets.enc.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(
        "invalid page margins in {path}: left {left} and right {right} leave no printable width"
    )]
    Margins { path: String, left: f32, right: f32 },
    #[error("could not determine the home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub logo: LogoConfig,
    pub text: TextConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogoConfig {
    pub filename: PathBuf,
    /// Distance from the page top to the logo's top edge, in points.
    #[serde(default)]
    pub vertical_space: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextConfig {
    #[serde(default)]
    pub salutation: String,
    #[serde(default)]
    pub signature: String,
    /// Distance from the page top to the first text row, in points.
    #[serde(default)]
    pub vertical_space: f32,
}

/// Optional TrueType faces; builtin Helvetica is used for any left unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FontsConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PageConfig {
    #[serde(default)]
    pub margin_left: f32,
    #[serde(default)]
    pub margin_right: f32,
}

impl PageConfig {
    pub fn margins(&self) -> Margins {
        Margins {
            left: self.margin_left,
            right: self.margin_right,
        }
    }

    /// Rows start at the left margin and wrap at the page width minus the
    /// right margin, so the left margin must sit inside that boundary.
    fn has_printable_width(&self) -> bool {
        let (left, right) = (self.margin_left, self.margin_right);
        left >= 0.0 && right >= 0.0 && left < PAGE_WIDTH_PT - right
    }
}

impl Config {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if !config.page.has_printable_width() {
            return Err(ConfigError::Margins {
                path: path.display().to_string(),
                left: config.page.margin_left,
                right: config.page.margin_right,
            });
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml, path)
    }
}

/// `~/.config/packingslipper`, on every platform.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(config_dir_in(base.home_dir()))
}

fn config_dir_in(home: &Path) -> PathBuf {
    home.join(".config").join(APP_DIR)
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

pub fn default_secrets_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(SECRETS_FILE))
}
