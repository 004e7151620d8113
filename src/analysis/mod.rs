//! Auxiliary analysis charts.
//!
//! - `series`: synthetic curves and the built-in convergence series
//! - `chart`: serializable chart descriptions
//! - `orchestrator`: activation flow and the source/sink seams

pub mod chart;
pub mod orchestrator;
pub mod series;

pub use chart::{Axis, AxisScale, ChartIds, ChartSpec, ChartTarget, Trace, TraceMode};
pub use orchestrator::{
    ActivationReport, AnalysisOrchestrator, ChartSink, ConvergenceOrigin, ConvergenceSource,
};
pub use series::{Series, fallback_convergence};
