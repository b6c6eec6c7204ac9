//! Integration tests for the packing slip pipeline.
//!
//! These tests validate:
//! - A fixed order payload produces the expected field sequence
//! - PDF output exists and has valid format
//! - The store client speaks the expected request and surfaces failures
//! - Out-of-range offsets fail without writing output

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use packing_slipper::cli::Cli;
use packing_slipper::config::Config;
use packing_slipper::error::Error;
use packing_slipper::label::{Element, Label};
use packing_slipper::order::{Order, OrderError, OrdersResponse};
use packing_slipper::shop::{OrderSource, ShopClient, ShopError};
use packing_slipper::{generate_slip, run, write_slip};
use secrecy::SecretString;

// =====================================================================
// Helpers
// =====================================================================

const ORDERS_JSON: &str = r##"{
  "orders": [
    {
      "name": "#1042",
      "created_at": "2025-11-28T16:20:00-08:00",
      "shipping_address": {
        "first_name": "Margaret",
        "last_name": "Hamilton",
        "address1": "4 Apollo Court",
        "address2": "Unit 11",
        "city": "Cambridge",
        "province_code": "MA",
        "zip": "02139",
        "country": "United States"
      },
      "line_items": [
        {"name": "Core Rope Memory", "quantity": 1, "sku": "CRM-01"},
        {"name": "Guidance Computer Sticker Pack", "quantity": 4, "sku": "STK-AGC"}
      ]
    },
    {
      "name": "#1041",
      "created_at": "2025-11-27T08:00:00Z",
      "shipping_address": {
        "first_name": "Katherine",
        "last_name": "Johnson",
        "address1": "1 Langley Blvd",
        "address2": null,
        "city": "Hampton",
        "province_code": "VA",
        "zip": "23681",
        "country": "United States"
      },
      "line_items": [{"name": "Slide Rule", "quantity": 2, "sku": "SR-2"}]
    }
  ]
}"##;

struct FixtureOrders(Vec<Order>);

impl FixtureOrders {
    fn load() -> Self {
        let parsed: OrdersResponse = serde_json::from_str(ORDERS_JSON).unwrap();
        Self(parsed.orders)
    }
}

impl OrderSource for FixtureOrders {
    fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        Ok(self.0.clone())
    }
}

fn write_logo(dir: &Path) -> PathBuf {
    let path = dir.join("logo.png");
    image::RgbImage::from_pixel(100, 36, image::Rgb([20, 20, 20]))
        .save(&path)
        .unwrap();
    path
}

fn write_config(dir: &Path) -> PathBuf {
    let logo = write_logo(dir);
    let path = dir.join("configuration.yaml");
    let yaml = format!(
        "logo:\n  filename: {}\n  vertical-space: 6\ntext:\n  salutation: \"Thank you for your order!\"\n  signature: \"Sam & the crew\"\n  vertical-space: 60\n",
        logo.display()
    );
    fs::write(&path, yaml).unwrap();
    path
}

fn load_config(dir: &Path) -> Config {
    Config::load(&write_config(dir)).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn args(parts: &[&OsStr]) -> Vec<OsString> {
    parts.iter().map(|p| p.to_os_string()).collect()
}

/// Serve exactly one HTTP response on a local port. Returns the base URL and
/// a receiver yielding the raw request head.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        tx.send(String::from_utf8_lossy(&request).into_owned()).unwrap();

        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    (format!("http://{addr}"), rx)
}

// =====================================================================
// Slip composition
// =====================================================================

#[test]
fn fixed_order_draws_fields_in_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let orders = FixtureOrders::load();

    let (bytes, label) =
        generate_slip(&orders.0[0], &config, &packing_slipper::fonts::FontManager::default())
            .unwrap();
    assert_valid_pdf(&bytes);

    assert!(matches!(label.elements[0], Element::Image { .. }));
    assert_eq!(
        label.texts(),
        vec![
            "Order #1042",
            "Nov 28, 2025",
            "SHIP TO",
            "Margaret Hamilton",
            "4 Apollo Court",
            "Unit 11",
            "Cambridge MA 02139",
            "United States",
            "Qty 1",
            "Core Rope Memory",
            "SKU: CRM-01",
            "Qty 4",
            // About 164 pt of Helvetica-Bold, wider than the label.
            "Guidance Computer Sticker",
            "Pack",
            "SKU: STK-AGC",
            "Thank you for your order!",
            "Sam & the crew",
        ]
    );
}

#[test]
fn text_rows_stay_inside_the_label() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let fonts = packing_slipper::fonts::FontManager::default();
    let orders = FixtureOrders::load();
    let (_, label) = generate_slip(&orders.0[0], &config, &fonts).unwrap();

    let mut last_y = f32::MIN;
    for element in &label.elements {
        if let Element::Text {
            text,
            x,
            y,
            style,
            font_size,
        } = element
        {
            assert!(*y > last_y, "rows must move down the page");
            last_y = *y;
            let width = fonts.measure_text_width(text, *font_size, *style);
            assert!(x + width <= label.page_width_pt, "{text:?} is too wide");
        }
    }
    assert!(last_y < label.page_height_pt);
}

#[test]
fn label_layout_survives_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let orders = FixtureOrders::load();
    let (_, label) = generate_slip(
        &orders.0[1],
        &config,
        &packing_slipper::fonts::FontManager::default(),
    )
    .unwrap();
    let back = Label::from_json(&label.to_json().unwrap()).unwrap();
    assert_eq!(back, label);
    assert!(!label.texts().contains(&""));
}

// =====================================================================
// Offsets and output
// =====================================================================

#[test]
fn write_slip_picks_order_by_offset() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let out = dir.path().join("out").join("slip.pdf");
    let layout = dir.path().join("slip.json");

    let label = write_slip(&FixtureOrders::load(), 1, &config, &out, Some(&layout)).unwrap();
    assert_eq!(label.texts()[0], "Order #1041");
    assert_valid_pdf(&fs::read(&out).unwrap());

    let dumped = Label::from_json(&fs::read_to_string(&layout).unwrap()).unwrap();
    assert_eq!(dumped, label);
}

#[test]
fn unwritable_layout_dump_still_leaves_the_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let out = dir.path().join("slip.pdf");
    // A regular file where the dump's parent directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();
    let layout = blocker.join("slip.json");

    let err = write_slip(&FixtureOrders::load(), 0, &config, &out, Some(&layout)).unwrap_err();
    assert!(matches!(err, Error::Write { .. }), "got {err:?}");
    assert_valid_pdf(&fs::read(&out).unwrap());
    assert!(!layout.exists());
}

#[test]
fn offset_past_the_list_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let out = dir.path().join("slip.pdf");

    let err = write_slip(&FixtureOrders::load(), 2, &config, &out, None).unwrap_err();
    assert!(matches!(
        err,
        Error::Order(OrderError::OffsetOutOfRange {
            offset: 2,
            count: 2
        })
    ));
    assert!(!out.exists());
}

// =====================================================================
// Store client
// =====================================================================

#[test]
fn client_requests_any_status_with_token() {
    let (base_url, requests) = serve_once("HTTP/1.1 200 OK", ORDERS_JSON);
    let client = ShopClient::with_base_url(
        &base_url,
        SecretString::from("shpat_test".to_string()),
        "2024-10",
    )
    .unwrap();

    let orders = client.list_orders().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].name, "#1042");

    let request = requests.recv().unwrap().to_lowercase();
    assert!(
        request.starts_with("get /admin/api/2024-10/orders.json?status=any "),
        "unexpected request: {request}"
    );
    assert!(request.contains("x-shopify-access-token: shpat_test"));
}

#[test]
fn client_surfaces_error_status() {
    let (base_url, _requests) = serve_once(
        "HTTP/1.1 401 Unauthorized",
        r#"{"errors":"[API] Invalid API key or access token"}"#,
    );
    let client =
        ShopClient::with_base_url(&base_url, SecretString::from("bad".to_string()), "2024-10")
            .unwrap();

    match client.list_orders() {
        Err(ShopError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn client_rejects_malformed_payload() {
    let (base_url, _requests) = serve_once("HTTP/1.1 200 OK", r#"{"orders": [{"name": 5}]}"#);
    let client =
        ShopClient::with_base_url(&base_url, SecretString::from("t".to_string()), "2024-10")
            .unwrap();
    assert!(matches!(client.list_orders(), Err(ShopError::Parse(_))));
}

// =====================================================================
// Full run
// =====================================================================

#[test]
fn run_end_to_end_with_plaintext_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let (base_url, _requests) = serve_once("HTTP/1.1 200 OK", ORDERS_JSON);

    let secrets = dir.path().join("secrets.yaml");
    fs::write(&secrets, format!("api:\n  token: shpat_test\n  shop: {base_url}\n")).unwrap();
    let out = dir.path().join("packingslip.pdf");

    let cli = Cli::try_parse_from(args(&[
        OsStr::new("packingslipper"),
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--secrets"),
        secrets.as_os_str(),
        OsStr::new("--outfile"),
        out.as_os_str(),
        OsStr::new("--plaintext-secrets"),
    ]))
    .unwrap();

    run(&cli).unwrap();
    assert_valid_pdf(&fs::read(&out).unwrap());
}

#[test]
fn run_fails_on_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("packingslip.pdf");
    let missing = dir.path().join("nope.yaml");

    let cli = Cli::try_parse_from(args(&[
        OsStr::new("packingslipper"),
        OsStr::new("--config"),
        missing.as_os_str(),
        OsStr::new("--secrets"),
        missing.as_os_str(),
        OsStr::new("--outfile"),
        out.as_os_str(),
    ]))
    .unwrap();

    let err = run(&cli).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!out.exists());
}
