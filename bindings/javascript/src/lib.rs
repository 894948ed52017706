//! JavaScript bindings for PayScan
//!
//! Thin wrapper around `payscan-core` compiled to WebAssembly.
//! ZERO logic here: the page gets exactly the CLI's amount handling.
//! QR drawing stays in the page; these bindings stop at the URL.

use payscan_core::keypad::{apply_key as core_apply_key, Key};
use payscan_core::{Generator, MemoryStore, Settings, SettingsStore};
use wasm_bindgen::prelude::*;

/// Normalize the amount field after an edit or keystroke.
///
/// Guarantees:
///   - Idempotent: normalizeAmount(normalizeAmount(x)) === normalizeAmount(x)
///   - At most one separator and two fractional digits
///
/// @param raw - current field text
/// @returns canonical display text (possibly empty)
#[wasm_bindgen(js_name = "normalizeAmount")]
pub fn normalize_amount(raw: &str) -> String {
    payscan_core::normalize_display(raw)
}

/// Parse display text to a number; unusable text is 0.
#[wasm_bindgen(js_name = "parseAmount")]
pub fn parse_amount(text: &str) -> f64 {
    payscan_core::parse_amount(text)
}

/// Two-decimal text, e.g. 12.5 → "12.50"
#[wasm_bindgen(js_name = "formatAmount")]
pub fn format_amount(value: f64) -> String {
    payscan_core::format_two_decimals(value)
}

/// Apply one keypad tap.
///
/// @param current - current field text
/// @param key - "0"-"9", "00", "C", "⌫", "," or "."
/// @returns new field text; unknown keys leave it unchanged
#[wasm_bindgen(js_name = "applyKey")]
pub fn apply_key(current: &str, key: &str) -> String {
    match Key::parse(key) {
        Some(key) => core_apply_key(current, key),
        None => current.to_string(),
    }
}

/// Validate settings from the dialog.
///
/// @returns JSON string `{ name, iban }` with cleaned values
/// @throws Error with the notice text when the name or IBAN is invalid
#[wasm_bindgen(js_name = "validateSettings")]
pub fn validate_settings(name: &str, iban: &str) -> Result<String, JsError> {
    let settings = Settings::validated(name, iban).map_err(|e| JsError::new(&e.to_string()))?;

    serde_json::to_string(&settings)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Build the pay URL for the current amount.
///
/// @param appUrl - location of the app page (`location.href`)
/// @param name - saved payee name
/// @param iban - saved payee IBAN
/// @param amount - amount field text
/// @returns fully-qualified pay URL with name, iban, amount, ref, txid
/// @throws Error when settings are missing or the amount is not positive
#[wasm_bindgen(js_name = "buildPayUrl")]
pub fn build_pay_url(app_url: &str, name: &str, iban: &str, amount: &str) -> Result<String, JsError> {
    pay_url(app_url, name, iban, amount).map_err(|e| JsError::new(&e.to_string()))
}

fn pay_url(app_url: &str, name: &str, iban: &str, amount: &str) -> payscan_core::Result<String> {
    let store = MemoryStore::new();
    store.save(&Settings {
        name: name.to_string(),
        iban: iban.to_string(),
    })?;

    let generator = Generator::for_app_url(store, app_url)?;
    let (_, url) = generator.generate(amount)?;
    Ok(url.into())
}
