//! Store Admin REST API client. Only one call is made per run: list the
//! most recent orders of any status.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::order::{Order, OrdersResponse};
use crate::secrets::Secrets;

/// Admin API version used unless overridden on the command line.
pub const DEFAULT_API_VERSION: &str = "2024-10";
/// The whole request, connect to last byte, must finish within this.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can list orders, newest first.
pub trait OrderSource {
    fn list_orders(&self) -> Result<Vec<Order>, ShopError>;
}

pub struct ShopClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_version: String,
    token: SecretString,
}

impl ShopClient {
    /// Client for the shop named in `secrets`.
    pub fn new(secrets: &Secrets, api_version: &str) -> Result<Self, ShopError> {
        Self::with_base_url(&shop_base_url(&secrets.shop), secrets.token.clone(), api_version)
    }

    /// Client against an explicit base URL such as `https://my-shop.myshopify.com`.
    pub fn with_base_url(
        base_url: &str,
        token: SecretString,
        api_version: &str,
    ) -> Result<Self, ShopError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            token,
        })
    }

    pub fn orders_url(&self) -> String {
        format!(
            "{}/admin/api/{}/orders.json",
            self.base_url, self.api_version
        )
    }
}

impl OrderSource for ShopClient {
    fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        let url = self.orders_url();
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("status", "any")])
            .header("X-Shopify-Access-Token", self.token.expose_secret())
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ShopError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OrdersResponse = serde_json::from_str(&body)?;
        log::debug!("store returned {} order(s)", parsed.orders.len());
        Ok(parsed.orders)
    }
}

/// `my-shop` → `https://my-shop.myshopify.com`; a name with a dot is taken
/// as the full domain.
pub fn shop_base_url(shop: &str) -> String {
    let shop = shop.trim();
    if shop.starts_with("http://") || shop.starts_with("https://") {
        shop.trim_end_matches('/').to_string()
    } else if shop.contains('.') {
        format!("https://{shop}")
    } else {
        format!("https://{shop}.myshopify.com")
    }
}
