//! Payee settings and the repository that persists them
//!
//! Settings live in a local-storage style key-value file: a JSON object
//! with the settings JSON-encoded as a string under [`SETTINGS_KEY`]. Other
//! entries are left as they are, whatever their type. Unreadable or corrupt
//! data loads as empty settings.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Key the settings are stored under
pub const SETTINGS_KEY: &str = "ps-settings";

/// Name and IBAN of the payee the generated codes pay to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub name: String,
    pub iban: String,
}

impl Settings {
    /// Clean and validate user input.
    ///
    /// The name is trimmed; the IBAN loses all whitespace and is upper-cased,
    /// then must match `^[A-Z]{2}\d{2}[A-Z0-9]{1,30}$` with ASCII digits.
    /// No checksum is computed.
    pub fn validated(name: &str, iban: &str) -> Result<Settings> {
        let name = name.trim();
        let iban = clean_iban(iban);

        if name.is_empty() {
            return Err(Error::InvalidSettings("name is empty".into()));
        }
        if !iban_shape().is_match(&iban) {
            return Err(Error::InvalidSettings(format!(
                "IBAN {:?} is not well-formed",
                iban
            )));
        }

        Ok(Settings {
            name: name.to_string(),
            iban,
        })
    }

    /// Both fields present
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.iban.is_empty()
    }
}

/// Strip whitespace and upper-case
pub fn clean_iban(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

fn iban_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| {
        Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}$").expect("IBAN pattern is valid")
    })
}

// ── Repository ─────────────────────────────────────────────

/// Where settings are loaded from and saved to
pub trait SettingsStore {
    /// Load settings; missing or corrupt data yields empty settings.
    fn load(&self) -> Settings;

    /// Overwrite the stored settings wholesale.
    fn save(&self, settings: &Settings) -> Result<()>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn load(&self) -> Settings {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        (**self).save(settings)
    }
}

fn decode_settings(raw: Option<&str>) -> Settings {
    match raw {
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::debug!("discarding corrupt settings: {}", e);
            Settings::default()
        }),
        None => Settings::default(),
    }
}

/// Settings kept in memory for the lifetime of the value
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an arbitrary raw value, as if written by someone else
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Settings {
        decode_settings(self.raw.borrow().as_deref())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let encoded = serde_json::to_string(settings)?;
        *self.raw.borrow_mut() = Some(encoded);
        Ok(())
    }
}

/// Settings persisted in a JSON key-value file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries of the file; an unreadable file is an empty map.
    fn entries(&self) -> BTreeMap<String, Value> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("no settings at {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("ignoring corrupt store {}: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Settings {
        let entries = self.entries();
        match entries.get(SETTINGS_KEY) {
            Some(Value::String(raw)) => decode_settings(Some(raw.as_str())),
            Some(other) => {
                tracing::debug!("discarding non-string settings entry: {}", other);
                Settings::default()
            }
            None => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut entries = self.entries();
        entries.insert(
            SETTINGS_KEY.to_string(),
            Value::String(serde_json::to_string(settings)?),
        );

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::info!("settings saved to {}", self.path.display());
        Ok(())
    }
}
