//! Pricing session state.
//!
//! The session owns the last accepted pricing result together with the
//! request that produced it, and hands out a token for every submission.
//! Only the answer to the most recent submission may replace the current
//! result; answers to older submissions are dropped.

use serde::Serialize;

use crate::api::{
    ConvergenceRequest, DateInfo, ExecutionTimes, Greeks, OptionInfo, PricingOutcome,
    PricingRequest, PricingResult,
};
use crate::layout::PruningReport;

/// Sequence number of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

/// The last accepted result and its request.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentResult {
    pub request: PricingRequest,
    pub result: PricingResult,
}

/// What became of an answer handed to [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Completion {
    /// Became the current result.
    Applied,
    /// The service refused the request; the message is the service's own.
    Rejected(String),
    /// A newer submission exists; the answer was ignored.
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    issued: u64,
    current: Option<CurrentResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new submission. Any earlier one becomes stale.
    pub fn begin_request(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    #[inline]
    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Hand over the answer to the submission identified by `token`.
    pub fn complete(
        &mut self,
        token: RequestToken,
        request: PricingRequest,
        outcome: PricingOutcome,
    ) -> Completion {
        if !self.is_latest(token) {
            log::info!(
                "dropping answer to request #{} (latest is #{})",
                token.0,
                self.issued
            );
            return Completion::Stale;
        }

        match outcome {
            PricingOutcome::Ok(result) => {
                self.current = Some(CurrentResult {
                    request,
                    result: *result,
                });
                Completion::Applied
            }
            PricingOutcome::Err(message) => {
                log::warn!("pricing rejected: {message}");
                Completion::Rejected(message)
            }
        }
    }

    pub fn current(&self) -> Option<&CurrentResult> {
        self.current.as_ref()
    }

    /// Convergence study parameters for the current result.
    pub fn convergence_request(&self) -> Option<ConvergenceRequest> {
        self.current
            .as_ref()
            .map(|current| ConvergenceRequest::from(&current.request))
    }

    pub fn summary(&self) -> Option<PricingSummary> {
        self.current.as_ref().map(PricingSummary::of)
    }
}

/// Figures of the result panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingSummary {
    pub trinomial_price: f64,
    pub reference_price: Option<f64>,
    /// Trinomial minus reference.
    pub difference: Option<f64>,
    /// Difference relative to the reference, in percent.
    pub percent_difference: Option<f64>,
    /// Both differences as displayed, e.g. `+0.012300 (+0.12%)`.
    pub difference_label: Option<String>,
    pub nodes_calculated: usize,
    /// Present when pruning was requested.
    pub pruning: Option<PruningReport>,
    /// Ignored share with one decimal.
    pub pruning_label: Option<String>,
    pub execution_times: ExecutionTimes,
    /// Trinomial minus reference time, in seconds.
    pub execution_delta: Option<f64>,
    pub date_info: Option<DateInfo>,
    pub option_info: Option<OptionInfo>,
    pub greeks: Option<Greeks>,
    pub warnings: Vec<String>,
}

impl PricingSummary {
    pub fn of(current: &CurrentResult) -> Self {
        let result = &current.result;
        let trinomial_price = result.trinomial_price();
        let reference_price = result.black_scholes_price;
        let difference = reference_price.map(|reference| trinomial_price - reference);
        let percent_difference = reference_price
            .zip(difference)
            .filter(|(reference, _)| *reference != 0.0)
            .map(|(reference, difference)| difference / reference * 100.0);
        let pruning = (current.request.threshold > 0.0).then(|| result.pruning());

        Self {
            trinomial_price,
            reference_price,
            difference,
            percent_difference,
            difference_label: difference.map(|d| difference_label(d, percent_difference)),
            nodes_calculated: result.dataset.nodes.len(),
            pruning_label: pruning.as_ref().map(PruningReport::percentage_label),
            pruning,
            execution_times: result.execution_times,
            execution_delta: result.execution_times.delta(),
            date_info: result.date_info.clone(),
            option_info: result.option_info,
            greeks: result.greeks,
            warnings: result.warnings().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Signed difference with six decimals and the percentage with two.
fn difference_label(difference: f64, percent: Option<f64>) -> String {
    let sign = if difference > 0.0 { "+" } else { "" };
    let percent = percent.unwrap_or(0.0);
    let percent_sign = if percent > 0.0 { "+" } else { "" };
    format!("{sign}{difference:.6} ({percent_sign}{percent:.2}%)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{OptionStyle, OptionType, PricingResponse};

    fn request(threshold: f64) -> PricingRequest {
        PricingRequest {
            spot: 100.0,
            strike: 100.0,
            start_date: "2025-01-01".to_string(),
            maturity_date: "2026-01-01".to_string(),
            rate: 0.05,
            volatility: 0.2,
            steps: 1,
            option_type: OptionType::Call,
            option_style: OptionStyle::European,
            dividend: 0.0,
            threshold,
            ex_div_date: None,
        }
    }

    fn accepted(final_price: f64) -> PricingOutcome {
        let json = format!(
            r#"{{
                "success": true,
                "data": {{
                    "nodes": [
                        {{"id": "0", "step": 0, "value": 100, "option_value": {final_price}}},
                        {{"id": "1", "step": 1, "value": 110, "option_value": 10}}
                    ],
                    "edges": [{{"source": "0", "target": "1", "direction": "up", "probability": 1.0}}],
                    "tree_params": {{"N": 1, "final_price": {final_price}}},
                    "black_scholes_price": 10.0,
                    "execution_times": {{"trinomial_time": 0.5, "blackscholes_time": 0.25}}
                }}
            }}"#
        );
        serde_json::from_str::<PricingResponse>(&json)
            .unwrap()
            .into_outcome()
    }

    #[test]
    fn test_latest_answer_applies() {
        let mut session = Session::new();
        let token = session.begin_request();
        assert_eq!(
            session.complete(token, request(0.0), accepted(10.5)),
            Completion::Applied
        );
        assert_eq!(session.current().unwrap().result.trinomial_price(), 10.5);
    }

    #[test]
    fn test_stale_answer_is_dropped() {
        let mut session = Session::new();
        let first = session.begin_request();
        let second = session.begin_request();

        assert_eq!(
            session.complete(second, request(0.0), accepted(11.0)),
            Completion::Applied
        );
        assert_eq!(
            session.complete(first, request(0.0), accepted(9.0)),
            Completion::Stale
        );
        assert_eq!(session.current().unwrap().result.trinomial_price(), 11.0);
    }

    #[test]
    fn test_rejection_keeps_previous_result() {
        let mut session = Session::new();
        let token = session.begin_request();
        session.complete(token, request(0.0), accepted(10.5));

        let token = session.begin_request();
        let completion =
            session.complete(token, request(0.0), PricingOutcome::Err("bad strike".to_string()));
        assert_eq!(completion, Completion::Rejected("bad strike".to_string()));
        assert!(session.current().is_some());
    }

    #[test]
    fn test_convergence_request_from_current() {
        let mut session = Session::new();
        assert!(session.convergence_request().is_none());

        let token = session.begin_request();
        session.complete(token, request(0.0), accepted(10.5));
        assert_eq!(session.convergence_request().unwrap().strike, 100.0);
    }

    #[test]
    fn test_summary() {
        let mut session = Session::new();
        let token = session.begin_request();
        session.complete(token, request(0.01), accepted(10.5));

        let summary = session.summary().unwrap();
        assert_eq!(summary.difference, Some(0.5));
        assert_eq!(summary.percent_difference, Some(5.0));
        assert_eq!(summary.difference_label.as_deref().unwrap(), "+0.500000 (+5.00%)");
        assert_eq!(summary.nodes_calculated, 2);
        assert_eq!(summary.execution_delta, Some(0.25));

        // N = 1 → 4 nodes in the full tree, 2 received
        assert_eq!(summary.pruning_label.as_deref(), Some("50.0"));
        let pruning = summary.pruning.unwrap();
        assert_eq!(pruning.ignored, 2);
        assert_eq!(pruning.percentage, 50.0);
    }

    #[test]
    fn test_summary_without_threshold_has_no_pruning() {
        let mut session = Session::new();
        let token = session.begin_request();
        session.complete(token, request(0.0), accepted(10.5));
        let summary = session.summary().unwrap();
        assert!(summary.pruning.is_none());
        assert!(summary.pruning_label.is_none());
    }
}
