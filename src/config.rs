//! View configuration.
//!
//! Passed from JavaScript as a plain object; every field is optional and
//! falls back to the default documented on it.

use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::analysis::ChartIds;
use crate::error::ViewError;
use crate::layout::{DetailPolicy, StepLayoutConfig};
use crate::viewport::ViewportConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Prefix of the service endpoints (default: "", same origin).
    pub api_base_url: String,
    /// Id of the `<svg>` element drawn into (default: "tree-svg").
    pub svg_element_id: String,
    /// Element whose size is the visible area (default: ".tree-area").
    pub container_selector: String,
    /// Class of the hover tooltip (default: "tooltip").
    pub tooltip_class: String,
    /// Control disabled while a pricing request runs (default: ".calculate-btn").
    pub calculate_button: String,
    /// Label of that control while busy (default: "Calculating...").
    pub busy_label: String,
    /// Layout width when the container reports no size (default: 1000.0).
    pub frame_width: f64,
    /// Layout height when the container reports no size (default: 600.0).
    pub frame_height: f64,
    /// Maximum log level: "error" to "trace", or "off" (default: "info").
    pub log_level: String,
    pub layout: StepLayoutConfig,
    pub detail: DetailPolicy,
    pub viewport: ViewportConfig,
    pub charts: ChartIds,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            svg_element_id: "tree-svg".to_string(),
            container_selector: ".tree-area".to_string(),
            tooltip_class: "tooltip".to_string(),
            calculate_button: ".calculate-btn".to_string(),
            busy_label: "Calculating...".to_string(),
            frame_width: 1000.0,
            frame_height: 600.0,
            log_level: "info".to_string(),
            layout: StepLayoutConfig::default(),
            detail: DetailPolicy::default(),
            viewport: ViewportConfig::default(),
            charts: ChartIds::default(),
        }
    }
}

impl ViewConfig {
    /// Read a configuration object; `undefined` and `null` give the defaults.
    pub fn from_js(value: JsValue) -> Result<Self, ViewError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_wasm_bindgen::from_value(value)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parsed `log_level`, `Info` when unrecognised.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}
