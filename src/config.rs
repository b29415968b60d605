//! Configuration
//!
//! A TOML file can override the default options record, the library names
//! of the fixed table symbols and styles, and the confirmation language:
//!
//! ```toml
//! locale = "en"
//!
//! [defaults]
//! libraryName = "brand-kit"
//! rowHeight = 48
//!
//! [catalog]
//! header_row_style = "Table/Row/_Title"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::builder::BuildContext;
use crate::core::options::{normalize, validate, Options, RawOptions};
use crate::library::LibraryCatalog;
use crate::utils::error::{TableError, TableResult};
use crate::utils::message::Locale;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: Locale,
    /// Fields folded over the built-in default record
    pub defaults: RawOptions,
    pub catalog: LibraryCatalog,
}

impl Config {
    pub fn from_toml(input: &str) -> TableResult<Self> {
        toml::from_str(input).map_err(|e| TableError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> TableResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TableError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Load `path` if given and present, else use built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> TableResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// The default options record with this configuration applied
    pub fn default_options(&self) -> TableResult<Options> {
        Ok(validate(normalize(&self.defaults)?)?)
    }

    pub fn build_context(&self) -> BuildContext {
        BuildContext {
            catalog: self.catalog.clone(),
            locale: self.locale,
        }
    }
}
