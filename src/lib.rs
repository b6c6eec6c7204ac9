//! # packing-slipper – store order → packing slip label PDF
//!
//! One run fetches a single order and renders it onto a 144×504 pt label:
//!
//! 1. **Configure** – plaintext YAML config ([`config`]) and SOPS-encrypted
//!    credentials ([`secrets`])
//! 2. **Fetch** – list recent orders from the store API ([`shop`]) and pick
//!    one by offset ([`order`])
//! 3. **Compose** – draw the slip fields through the wrapping line writer
//!    ([`slip`], [`writer`]) into a frozen layout ([`label`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! [`pipeline::run`] performs the whole thing for the `packingslipper` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod fonts;
pub mod label;
pub mod order;
pub mod pipeline;
pub mod render;
pub mod secrets;
pub mod shop;
pub mod slip;
pub mod writer;

// Re-exports for convenience
pub use error::{Error, Result};
pub use pipeline::{generate_slip, run, write_slip};
