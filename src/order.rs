//! Order payload as returned by the store's `orders.json` endpoint.
//!
//! Only the fields the slip prints are modelled. The API sends `null` for
//! many optional strings, so those deserialize to empty strings.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order offset {offset} is out of range: the store returned {count} order(s)")]
    OffsetOutOfRange { offset: usize, count: usize },
}

/// Body of `GET /admin/api/<version>/orders.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_address: ShippingAddress,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address1: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address2: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub province_code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub zip: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub quantity: u32,
    #[serde(deserialize_with = "null_as_empty")]
    pub sku: String,
}

impl Order {
    /// `"Jan 2, 2006"` style date the order was placed, in its own offset.
    pub fn created_date(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}

impl ShippingAddress {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// `"City PROV ZIP"`.
    pub fn city_line(&self) -> String {
        format!("{} {} {}", self.city, self.province_code, self.zip)
    }
}

/// Pick the order `offset` places back from the most recent one. The store
/// lists newest first.
pub fn select_order(orders: &[Order], offset: usize) -> Result<&Order, OrderError> {
    orders.get(offset).ok_or(OrderError::OffsetOutOfRange {
        offset,
        count: orders.len(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
