/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 15/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use crate::error::{Result, ShapefileError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for opening a Shapefile. Passed explicitly to `Shapefile::open`;
/// can be stored as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShapefileConfig {
    /// Attach the typed attribute row to each shape instead of the
    /// name-to-string mapping.
    pub raw_metadata_only: bool,
    /// Log a summary of each opened file at info level.
    pub verbose_mode: bool,
    /// Reject files whose header declares more bytes than the file holds.
    pub strict_file_length: bool,
}

impl Default for ShapefileConfig {
    fn default() -> ShapefileConfig {
        ShapefileConfig {
            raw_metadata_only: false,
            verbose_mode: false,
            strict_file_length: true,
        }
    }
}

impl ShapefileConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<ShapefileConfig> {
        let contents = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&contents).map_err(|e| {
            ShapefileError::invalid_argument(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let configs_json = serde_json::to_string_pretty(self).map_err(|e| {
            ShapefileError::invalid_argument(format!("error converting config to JSON: {}", e))
        })?;
        fs::write(path, configs_json)?;
        Ok(())
    }
}
