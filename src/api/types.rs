//! Request and response types of the pricing service.
//!
//! Field names follow the service's JSON (`S0`, `K`, `N`, `T_years`, …);
//! the Rust side uses descriptive names. Responses are decoded permissively
//! and validated once, in [`PricingResponse::into_outcome`].

use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::graph::{RawTreeData, TreeDataset, TreeEdge, TreeNode, TreeParams};
use crate::layout::PruningReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStyle {
    #[default]
    European,
    American,
}

/// Body of `POST /api/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    #[serde(rename = "S0")]
    pub spot: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    pub start_date: String,
    pub maturity_date: String,
    #[serde(rename = "r")]
    pub rate: f64,
    #[serde(rename = "sigma")]
    pub volatility: f64,
    #[serde(rename = "N")]
    pub steps: u32,
    pub option_type: OptionType,
    pub option_style: OptionStyle,
    #[serde(default)]
    pub dividend: f64,
    /// Pruning threshold as a fraction (0 disables pruning).
    #[serde(default)]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ex_div_date: Option<String>,
}

/// Body of `POST /api/convergence`: the pricing request without the
/// tree-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceRequest {
    #[serde(rename = "S0")]
    pub spot: f64,
    #[serde(rename = "K")]
    pub strike: f64,
    pub start_date: String,
    pub maturity_date: String,
    #[serde(rename = "r")]
    pub rate: f64,
    #[serde(rename = "sigma")]
    pub volatility: f64,
    pub option_type: OptionType,
    pub option_style: OptionStyle,
    pub dividend: f64,
}

impl From<&PricingRequest> for ConvergenceRequest {
    fn from(request: &PricingRequest) -> Self {
        Self {
            spot: request.spot,
            strike: request.strike,
            start_date: request.start_date.clone(),
            maturity_date: request.maturity_date.clone(),
            rate: request.rate,
            volatility: request.volatility,
            option_type: request.option_type,
            option_style: request.option_style,
            dividend: request.dividend,
        }
    }
}

/// One point of the convergence study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    #[serde(rename = "N")]
    pub steps: u32,
    pub trinomial_price: f64,
    pub blackscholes_price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvergenceResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<ConvergencePoint>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ConvergenceResponse {
    /// The series, empty when the service sent none.
    pub fn into_series(self) -> Result<Vec<ConvergencePoint>, ViewError> {
        if !self.success {
            return Err(ViewError::Rejected(
                self.error
                    .unwrap_or_else(|| "convergence request failed".to_string()),
            ));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Maturity as computed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateInfo {
    pub calculated_from_dates: bool,
    pub start_date: Option<String>,
    pub maturity_date: Option<String>,
    #[serde(rename = "T_years")]
    pub years: f64,
    #[serde(rename = "T_days")]
    pub days: Option<i64>,
}

/// Wall-clock timings of both pricers, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionTimes {
    pub trinomial_time: Option<f64>,
    pub blackscholes_time: Option<f64>,
}

impl ExecutionTimes {
    /// Trinomial minus reference time, when both were measured.
    pub fn delta(&self) -> Option<f64> {
        match (self.trinomial_time, self.blackscholes_time) {
            (Some(tree), Some(reference)) if tree > 0.0 && reference > 0.0 => {
                Some(tree - reference)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionInfo {
    #[serde(rename = "type")]
    pub option_type: OptionType,
    #[serde(rename = "style")]
    pub option_style: OptionStyle,
}

/// The `data` member of a pricing response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingData {
    #[serde(default)]
    pub nodes: Option<Vec<TreeNode>>,
    #[serde(default)]
    pub edges: Option<Vec<TreeEdge>>,
    #[serde(default)]
    pub tree_params: Option<TreeParams>,
    #[serde(default)]
    pub black_scholes_price: Option<f64>,
    #[serde(default)]
    pub date_info: Option<DateInfo>,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default)]
    pub warning_message: Option<String>,
    #[serde(default)]
    pub nodes_ignored_by_original_threshold: Option<u64>,
    #[serde(default)]
    pub execution_times: Option<ExecutionTimes>,
    #[serde(default)]
    pub option_info: Option<OptionInfo>,
}

/// Envelope of `POST /api/calculate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<PricingData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub greeks: Option<Greeks>,
}

/// A response checked at the boundary.
#[derive(Debug, Clone)]
pub enum PricingOutcome {
    Ok(Box<PricingResult>),
    Err(String),
}

/// A successful, validated pricing response.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub dataset: TreeDataset,
    pub black_scholes_price: Option<f64>,
    pub date_info: Option<DateInfo>,
    pub fallback_used: bool,
    pub warning_message: Option<String>,
    pub nodes_ignored_by_original_threshold: Option<u64>,
    pub execution_times: ExecutionTimes,
    pub option_info: Option<OptionInfo>,
    pub greeks: Option<Greeks>,
    pub warning: Option<String>,
}

impl PricingResponse {
    /// Validate the envelope. A rejected response carries the service's
    /// message verbatim; an accepted one must hold a complete tree.
    pub fn into_outcome(self) -> PricingOutcome {
        if !self.success {
            return PricingOutcome::Err(
                self.error
                    .unwrap_or_else(|| "pricing request failed".to_string()),
            );
        }
        let Some(data) = self.data else {
            return PricingOutcome::Err(ViewError::MissingField("data").to_string());
        };

        let raw = RawTreeData {
            nodes: data.nodes,
            edges: data.edges,
            tree_params: data.tree_params,
        };
        match TreeDataset::try_from(raw) {
            Ok(dataset) => PricingOutcome::Ok(Box::new(PricingResult {
                dataset,
                black_scholes_price: data.black_scholes_price,
                date_info: data.date_info,
                fallback_used: data.fallback_used,
                warning_message: data.warning_message,
                nodes_ignored_by_original_threshold: data.nodes_ignored_by_original_threshold,
                execution_times: data.execution_times.unwrap_or_default(),
                option_info: data.option_info,
                greeks: self.greeks,
                warning: self.warning,
            })),
            Err(err) => PricingOutcome::Err(err.to_string()),
        }
    }
}

impl PricingResult {
    /// Root valuation of the tree.
    pub fn trinomial_price(&self) -> f64 {
        self.dataset.tree_params.final_price
    }

    /// Nodes removed by pruning, with the fallback override applied.
    pub fn pruning(&self) -> PruningReport {
        let override_count = if self.fallback_used {
            self.nodes_ignored_by_original_threshold
        } else {
            None
        };
        PruningReport::new(
            self.dataset.depth(),
            self.dataset.nodes.len(),
            override_count,
        )
    }

    /// Every warning the service attached, response-level first.
    pub fn warnings(&self) -> Vec<&str> {
        let fallback = if self.fallback_used {
            self.warning_message.as_deref()
        } else {
            None
        };
        self.warning.as_deref().into_iter().chain(fallback).collect()
    }
}
