//! Packing slip composition: the fixed sequence of fields drawn onto the
//! label for one order.

use thiserror::Error;

use crate::config::Config;
use crate::fonts::{FontManager, FontStyle};
use crate::label::Label;
use crate::order::Order;
use crate::writer::LineWriter;

#[derive(Debug, Error)]
pub enum SlipError {
    #[error("failed to load logo {path}: {source}")]
    Logo {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Lay out the packing slip for `order`.
///
/// Draw order: logo, order number and date, ship-to block, each line item,
/// salutation, signature.
pub fn compose_slip(order: &Order, config: &Config, fonts: &FontManager) -> Result<Label, SlipError> {
    let mut label = Label::packing_slip();
    label.title = format!("Packing slip {}", order.name);

    let margins = config.page.margins();
    let mut w = LineWriter::new(&mut label, fonts, margins);

    w.set_xy(margins.left, config.logo.vertical_space);
    w.image(&config.logo.filename).map_err(|source| SlipError::Logo {
        path: config.logo.filename.display().to_string(),
        source,
    })?;

    w.set_xy(margins.left, config.text.vertical_space);
    w.write_line(&format!("Order {}", order.name));
    w.write_line(&format!("{}\n\n", order.created_date()));

    w.set_style(FontStyle::Bold);
    w.write_line("SHIP TO\n");

    let address = &order.shipping_address;
    w.set_style(FontStyle::Regular);
    w.write_line(&address.full_name());
    w.write_line(&address.address1);
    if !address.address2.is_empty() {
        w.write_line(&address.address2);
    }
    w.write_line(&format!("{}\n", address.city_line()));
    w.write_line(&format!("{}\n\n", address.country));

    for item in &order.line_items {
        w.set_style(FontStyle::Regular);
        w.write_line(&format!("Qty {}", item.quantity));
        w.set_style(FontStyle::Bold);
        w.write_line(&item.name);
        w.set_style(FontStyle::Regular);
        w.write_line(&format!("SKU: {}\n\n", item.sku));
    }

    w.write_line(&config.text.salutation);
    w.set_style(FontStyle::Bold);
    w.write_line(&config.text.signature);

    if w.y() > w.page_height() {
        log::warn!("slip content runs past the bottom of the label and will be clipped");
    }

    Ok(label)
}
