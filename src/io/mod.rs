//! File I/O for map layers and JSON reports.
//!
//! - `load_anchor_layer` / `load_text_layer`: read a GeoJSON file into a
//!   validated, CRS-tagged [`Layer`].
//! - `write_json_file`: pretty-print a serializable value to disk.
pub mod geojson;

use crate::projection::{Crs, Layer};
use crate::records::{anchors_from_records, texts_from_records};
use crate::types::{Anchor, TextDetection};
use self::geojson::{AnchorFields, TextFields};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load building-patch predictions. A `crs` member in the file wins over
/// `default_crs`.
pub fn load_anchor_layer(
    path: &Path,
    fields: &AnchorFields,
    default_crs: Crs,
) -> Result<Layer<Anchor>, String> {
    let data = read(path)?;
    let (crs, records) =
        geojson::parse_anchors(&data, fields).map_err(|e| format!("{}: {e}", path.display()))?;
    let anchors = anchors_from_records(records).map_err(|e| format!("{}: {e}", path.display()))?;
    let crs = crs.unwrap_or(default_crs);
    debug!("loaded {} anchors from {} ({crs})", anchors.len(), path.display());
    Ok(Layer::new(crs, anchors))
}

/// Load text-spotting output. A `crs` member in the file wins over
/// `default_crs`.
pub fn load_text_layer(
    path: &Path,
    fields: &TextFields,
    default_crs: Crs,
) -> Result<Layer<TextDetection>, String> {
    let data = read(path)?;
    let (crs, records) =
        geojson::parse_texts(&data, fields).map_err(|e| format!("{}: {e}", path.display()))?;
    let texts = texts_from_records(records).map_err(|e| format!("{}: {e}", path.display()))?;
    let crs = crs.unwrap_or(default_crs);
    debug!("loaded {} texts from {} ({crs})", texts.len(), path.display());
    Ok(Layer::new(crs, texts))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
