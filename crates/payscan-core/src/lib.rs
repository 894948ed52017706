//! PayScan Core - turns a typed amount into a scannable pay request
//!
//! All front ends (the `payscan` CLI, the WebAssembly bindings) share this
//! crate, so amount handling behaves identically everywhere.
//!
//! # Architecture
//!
//! ```text
//! keypad taps → amount::normalize_display → AmountText
//!                                              ↓ (submit)
//! SettingsStore → Generator::prepare → PaymentRequest → pay URL
//!                                                          ↓
//!                                       qr::render → qr::composite_logo → PNG
//! ```
//!
//! # Guarantees
//!
//! - **Total amount handling**: normalizing and parsing never fail
//! - **Fresh requests**: every generation gets its own reference and txid
//! - **Ordered rendering**: the logo is composited only on a finished canvas

pub mod amount;
pub mod error;
pub mod generator;
pub mod keypad;
#[cfg(feature = "render")]
pub mod qr;
pub mod request;
pub mod settings;

pub use amount::{
    format_two_decimals, normalize_display, normalize_display_with, parse_amount,
    parse_amount_with, DEFAULT_SEPARATORS,
};
pub use error::{Error, Result};
pub use generator::Generator;
pub use keypad::{apply_key, Key};
pub use request::PaymentRequest;
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
