//! Pipeline – ties together config loading, the order fetch, slip
//! composition and rendering into a single run.

use std::fs;
use std::path::Path;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fonts::{FontManager, FontStyle};
use crate::label::Label;
use crate::order::{select_order, Order};
use crate::render::render_pdf;
use crate::secrets::{Decryptor, PlaintextDecryptor, Secrets, SopsDecryptor};
use crate::shop::{OrderSource, ShopClient};
use crate::slip::compose_slip;

/// Build the font set named in the config; unset styles stay builtin.
pub fn load_fonts(config: &Config) -> Result<FontManager> {
    let mut fonts = FontManager::new();
    if let Some(path) = &config.fonts.regular {
        fonts.load_font_file(FontStyle::Regular, path)?;
    }
    if let Some(path) = &config.fonts.bold {
        fonts.load_font_file(FontStyle::Bold, path)?;
    }
    Ok(fonts)
}

/// Lay out and render the slip for one order.
///
/// Returns `(pdf_bytes, label)`.
pub fn generate_slip(order: &Order, config: &Config, fonts: &FontManager) -> Result<(Vec<u8>, Label)> {
    let label = compose_slip(order, config, fonts)?;
    let pdf_bytes = render_pdf(&label, fonts)?;
    Ok((pdf_bytes, label))
}

/// Fetch the orders, pick one by offset and write its slip to `out`.
pub fn write_slip(
    source: &dyn OrderSource,
    offset: usize,
    config: &Config,
    out: &Path,
    layout_json: Option<&Path>,
) -> Result<Label> {
    let fonts = load_fonts(config)?;

    let orders = source.list_orders()?;
    let order = select_order(&orders, offset)?;
    log::info!("Got order {} (offset {offset} of {})", order.name, orders.len());

    let (bytes, label) = generate_slip(order, config, &fonts)?;
    let layout = match layout_json {
        Some(path) => Some((path, label.to_json()?)),
        None => None,
    };

    // The slip first: a failed layout dump still leaves a printable PDF.
    write_file(out, &bytes)?;
    log::info!("Wrote '{}' ({} bytes)", out.display(), bytes.len());

    if let Some((path, json)) = layout {
        write_file(path, json.as_bytes())?;
        log::info!("Wrote label layout to '{}'", path.display());
    }
    Ok(label)
}

/// The whole command-line run.
pub fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config_path()?;
    let secrets_path = cli.secrets_path()?;
    log::info!("Using configuration {}", config_path.display());
    log::info!("Using secrets {}", secrets_path.display());

    let config = Config::load(&config_path)?;

    let decryptor: Box<dyn Decryptor> = if cli.plaintext_secrets {
        Box::new(PlaintextDecryptor)
    } else {
        Box::new(SopsDecryptor::new(&cli.sops_binary))
    };
    let secrets = Secrets::load(&secrets_path, decryptor.as_ref())?;

    let client = ShopClient::new(&secrets, &cli.api_version)?;
    drop(secrets);

    write_slip(
        &client,
        cli.order_offset,
        &config,
        &cli.out_filename,
        cli.layout_json.as_deref(),
    )?;
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.display().to_string(),
        source,
    })
}
