//! Chart descriptions.
//!
//! A [`ChartSpec`] carries everything a plotting library needs to draw one
//! chart, and nothing about how. It serializes to a plain object that maps
//! directly onto scatter-trace plotting APIs.

use serde::{Deserialize, Serialize};

use super::series::{self, Series};
use crate::api::ConvergencePoint;

/// The four analysis charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTarget {
    Convergence,
    Nodes,
    Timing,
    Precision,
}

/// Page element ids of the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartIds {
    /// (default: "convergence-plot")
    pub convergence: String,
    /// (default: "nodes-plot")
    pub nodes: String,
    /// (default: "timing-plot")
    pub timing: String,
    /// (default: "precision-plot")
    pub precision: String,
}

impl Default for ChartIds {
    fn default() -> Self {
        Self {
            convergence: "convergence-plot".to_string(),
            nodes: "nodes-plot".to_string(),
            timing: "timing-plot".to_string(),
            precision: "precision-plot".to_string(),
        }
    }
}

impl ChartIds {
    pub fn element_id(&self, target: ChartTarget) -> &str {
        match target {
            ChartTarget::Convergence => &self.convergence,
            ChartTarget::Nodes => &self.nodes,
            ChartTarget::Timing => &self.timing,
            ChartTarget::Precision => &self.precision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: TraceMode,
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
}

impl Trace {
    fn new(name: &str, series: Series, mode: TraceMode, color: &'static str, width: f64) -> Self {
        Self {
            name: name.to_string(),
            x: series.x,
            y: series.y,
            mode,
            color,
            width,
            dashed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    Log,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub scale: AxisScale,
}

impl Axis {
    fn linear(title: &str) -> Self {
        Self {
            title: title.to_string(),
            scale: AxisScale::Linear,
        }
    }
}

/// A complete chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub target: ChartTarget,
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

const STEPS_AXIS: &str = "Number of Steps (N)";

impl ChartSpec {
    /// Trinomial price against N, with the reference price as a dashed line.
    pub fn convergence(points: &[ConvergencePoint]) -> Self {
        let steps: Vec<f64> = points.iter().map(|p| f64::from(p.steps)).collect();
        let trinomial = Series {
            x: steps.clone(),
            y: points.iter().map(|p| p.trinomial_price).collect(),
        };
        let reference = Series {
            x: steps,
            y: points.iter().map(|p| p.blackscholes_price).collect(),
        };

        let mut reference = Trace::new("Black-Scholes", reference, TraceMode::Lines, "#ff6b6b", 2.0);
        reference.dashed = true;

        Self {
            target: ChartTarget::Convergence,
            title: "Convergence of Trinomial Model to Black-Scholes".to_string(),
            traces: vec![
                Trace::new("Trinomial Tree", trinomial, TraceMode::LinesMarkers, "#4fc3f7", 2.0),
                reference,
            ],
            x_axis: Axis::linear("N (number of steps in the trinomial tree)"),
            y_axis: Axis::linear("Option Price"),
        }
    }

    pub fn nodes() -> Self {
        Self {
            target: ChartTarget::Nodes,
            title: "Number of Nodes vs Steps (N)".to_string(),
            traces: vec![Trace::new(
                "Nodes Count",
                series::node_count_series(),
                TraceMode::Lines,
                "#00d4ff",
                2.0,
            )],
            x_axis: Axis::linear(STEPS_AXIS),
            y_axis: Axis::linear("Number of Nodes"),
        }
    }

    pub fn timing() -> Self {
        Self {
            target: ChartTarget::Timing,
            title: "Execution Time vs Number of Steps (N)".to_string(),
            traces: vec![Trace::new(
                "Execution Time",
                series::timing_series(),
                TraceMode::LinesMarkers,
                "#ff6b35",
                2.0,
            )],
            x_axis: Axis::linear(STEPS_AXIS),
            y_axis: Axis::linear("Execution Time (ms)"),
        }
    }

    /// Absolute error on a logarithmic axis.
    pub fn precision() -> Self {
        Self {
            target: ChartTarget::Precision,
            title: "Convergence Precision: |Trinomial - Black-Scholes|".to_string(),
            traces: vec![Trace::new(
                "Absolute Error",
                series::precision_series(),
                TraceMode::LinesMarkers,
                "#e74c3c",
                3.0,
            )],
            x_axis: Axis::linear(STEPS_AXIS),
            y_axis: Axis {
                title: "Absolute Error (€)".to_string(),
                scale: AxisScale::Log,
            },
        }
    }
}
