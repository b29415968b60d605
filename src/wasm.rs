//! WASM bindings for table-generator
//!
//! This module provides JavaScript-accessible option normalization and
//! layout previews for the options window.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::Serialize;

#[cfg(feature = "wasm")]
use crate::{plan_table, resolve_all, Libraries, LibraryCatalog, Options, RawOptions, TablePlan};

/// Result envelope returned to JavaScript
#[cfg(feature = "wasm")]
#[derive(Serialize)]
pub struct WasmResult<T: Serialize> {
    /// Whether the call succeeded
    pub success: bool,
    /// The result, when successful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<T>,
    /// Error message if the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(feature = "wasm")]
impl<T: Serialize> WasmResult<T> {
    fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(output) => WasmResult {
                success: true,
                output: Some(output),
                error: None,
            },
            Err(e) => WasmResult {
                success: false,
                output: None,
                error: Some(e.to_string()),
            },
        }
    }

    fn into_js(self) -> JsValue {
        // Plain objects rather than JS Maps for metadata
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        self.serialize(&serializer).unwrap_or(JsValue::NULL)
    }
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Read a field map posted as an object or as a JSON string
#[cfg(feature = "wasm")]
fn raw_options(raw: JsValue) -> Result<RawOptions, String> {
    if let Some(text) = raw.as_string() {
        return RawOptions::from_json(&text).map_err(|e| e.to_string());
    }
    if raw.is_undefined() || raw.is_null() {
        return Ok(RawOptions::new());
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(raw).map_err(|e| e.to_string())?;
    RawOptions::from_value(value).map_err(|e| e.to_string())
}

#[cfg(feature = "wasm")]
fn options_from_js(raw: JsValue) -> Result<Options, String> {
    let raw = raw_options(raw)?;
    crate::normalize(&raw)
        .and_then(crate::validate)
        .map_err(|e| e.to_string())
}

/// Normalize and validate a posted field map
///
/// # Arguments
/// * `raw` - Field map, as an object or a JSON string
///
/// # Returns
/// `{ success, output?: Options, error? }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "normalizeOptions")]
pub fn normalize_options_wasm(raw: JsValue) -> JsValue {
    WasmResult::from_result(options_from_js(raw)).into_js()
}

/// Plan a table without a document
///
/// # Arguments
/// * `options` - Field map, as an object or a JSON string
/// * `library` - Library collection; the standard library when omitted
///
/// # Returns
/// `{ success, output?: TablePlan, error? }`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "planTable")]
pub fn plan_table_wasm(options: JsValue, library: JsValue) -> JsValue {
    let result = (|| -> Result<TablePlan, String> {
        let options = options_from_js(options)?;
        let libraries = if library.is_undefined() || library.is_null() {
            Libraries::standard()
        } else {
            serde_wasm_bindgen::from_value(library).map_err(|e| e.to_string())?
        };
        let handles = futures::executor::block_on(resolve_all(
            &libraries,
            &options,
            &LibraryCatalog::default(),
        ))
        .map_err(|e| e.to_string())?;
        Ok(plan_table(&options, &handles))
    })();
    WasmResult::from_result(result).into_js()
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
