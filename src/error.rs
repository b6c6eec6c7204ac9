//! Crate-wide error type. Every variant is fatal to a run.

use thiserror::Error;

use crate::config::ConfigError;
use crate::fonts::FontError;
use crate::order::OrderError;
use crate::render::RenderError;
use crate::secrets::SecretsError;
use crate::shop::ShopError;
use crate::slip::SlipError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secrets(#[from] SecretsError),
    #[error(transparent)]
    Shop(#[from] ShopError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error(transparent)]
    Slip(#[from] SlipError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise label layout: {0}")]
    LayoutJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
