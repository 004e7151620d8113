//! Analysis-chart orchestration.
//!
//! Activation always redraws the three synthetic charts, then resolves the
//! convergence chart: from the service when a pricing result exists, from
//! the built-in series otherwise or whenever the service has nothing usable.
//! No failure here is surfaced to the user; it is logged and the charts
//! degrade.

use serde::Serialize;

use super::chart::{ChartIds, ChartSpec, ChartTarget};
use super::series;
use crate::api::{ConvergencePoint, ConvergenceRequest};
use crate::error::ViewError;

/// Provider of convergence studies.
#[allow(async_fn_in_trait)]
pub trait ConvergenceSource {
    async fn convergence(
        &self,
        request: &ConvergenceRequest,
    ) -> Result<Vec<ConvergencePoint>, ViewError>;
}

/// Receiver of chart descriptions.
pub trait ChartSink {
    fn render(&mut self, element_id: &str, spec: &ChartSpec) -> Result<(), ViewError>;
}

/// Where the convergence chart's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceOrigin {
    Service,
    Fallback,
}

/// What one activation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationReport {
    pub rendered: Vec<ChartTarget>,
    pub failed: Vec<ChartTarget>,
    pub convergence: ConvergenceOrigin,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOrchestrator {
    ids: ChartIds,
}

impl AnalysisOrchestrator {
    pub fn new(ids: ChartIds) -> Self {
        Self { ids }
    }

    /// Render all four charts.
    ///
    /// `request` is derived from the current pricing result, if any. The
    /// service is asked at most once per activation.
    pub async fn activate<S, K>(
        &self,
        request: Option<&ConvergenceRequest>,
        source: &S,
        sink: &mut K,
    ) -> ActivationReport
    where
        S: ConvergenceSource + ?Sized,
        K: ChartSink + ?Sized,
    {
        let mut report = ActivationReport {
            rendered: Vec::with_capacity(4),
            failed: Vec::new(),
            convergence: ConvergenceOrigin::Fallback,
        };

        for spec in [ChartSpec::nodes(), ChartSpec::timing(), ChartSpec::precision()] {
            self.emit(&spec, sink, &mut report);
        }

        let points = match request {
            Some(request) => match source.convergence(request).await {
                Ok(points) if !points.is_empty() => {
                    log::info!("convergence: {} points from the service", points.len());
                    report.convergence = ConvergenceOrigin::Service;
                    points
                }
                Ok(_) => {
                    log::warn!("convergence: service returned no points, using built-in series");
                    series::fallback_convergence()
                }
                Err(err) => {
                    log::warn!("convergence: {err}, using built-in series");
                    series::fallback_convergence()
                }
            },
            None => series::fallback_convergence(),
        };

        self.emit(&ChartSpec::convergence(&points), sink, &mut report);
        report
    }

    fn emit<K: ChartSink + ?Sized>(&self, spec: &ChartSpec, sink: &mut K, report: &mut ActivationReport) {
        let element_id = self.ids.element_id(spec.target);
        match sink.render(element_id, spec) {
            Ok(()) => report.rendered.push(spec.target),
            Err(err) => {
                log::warn!("chart #{element_id} not rendered: {err}");
                report.failed.push(spec.target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{OptionStyle, OptionType};
    use std::cell::Cell;
    use std::collections::HashMap;

    struct Fixed {
        answer: Result<Vec<ConvergencePoint>, String>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(answer: Result<Vec<ConvergencePoint>, String>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl ConvergenceSource for Fixed {
        async fn convergence(
            &self,
            _request: &ConvergenceRequest,
        ) -> Result<Vec<ConvergencePoint>, ViewError> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone().map_err(ViewError::Transport)
        }
    }

    #[derive(Default)]
    struct Recorder {
        charts: HashMap<String, ChartSpec>,
        refuse: Option<&'static str>,
    }

    impl ChartSink for Recorder {
        fn render(&mut self, element_id: &str, spec: &ChartSpec) -> Result<(), ViewError> {
            if self.refuse == Some(element_id) {
                return Err(ViewError::Dom("plot library missing".to_string()));
            }
            self.charts.insert(element_id.to_string(), spec.clone());
            Ok(())
        }
    }

    fn request() -> ConvergenceRequest {
        ConvergenceRequest {
            spot: 100.0,
            strike: 100.0,
            start_date: "2025-01-01".to_string(),
            maturity_date: "2026-01-01".to_string(),
            rate: 0.05,
            volatility: 0.2,
            option_type: OptionType::Call,
            option_style: OptionStyle::European,
            dividend: 0.0,
        }
    }

    fn convergence_prices(sink: &Recorder) -> Vec<f64> {
        sink.charts["convergence-plot"].traces[0].y.clone()
    }

    #[test]
    fn test_no_result_uses_fallback_without_calling() {
        let source = Fixed::new(Ok(vec![]));
        let mut sink = Recorder::default();
        let report = pollster::block_on(
            AnalysisOrchestrator::default().activate(None, &source, &mut sink),
        );

        assert_eq!(source.calls.get(), 0);
        assert_eq!(report.convergence, ConvergenceOrigin::Fallback);
        assert_eq!(report.rendered.len(), 4);
        assert_eq!(convergence_prices(&sink).len(), 6);
    }

    #[test]
    fn test_empty_response_falls_back() {
        let source = Fixed::new(Ok(vec![]));
        let mut sink = Recorder::default();
        let report = pollster::block_on(
            AnalysisOrchestrator::default().activate(Some(&request()), &source, &mut sink),
        );

        assert_eq!(source.calls.get(), 1);
        assert_eq!(report.convergence, ConvergenceOrigin::Fallback);
        let reference = &sink.charts["convergence-plot"].traces[1].y;
        assert_eq!(reference.len(), 6);
        assert!(reference.iter().all(|&p| p == 10.45));
    }

    #[test]
    fn test_failed_fetch_falls_back() {
        let source = Fixed::new(Err("connection refused".to_string()));
        let mut sink = Recorder::default();
        let report = pollster::block_on(
            AnalysisOrchestrator::default().activate(Some(&request()), &source, &mut sink),
        );

        assert_eq!(report.convergence, ConvergenceOrigin::Fallback);
        assert_eq!(convergence_prices(&sink)[0], 10.55);
    }

    #[test]
    fn test_service_series_is_used() {
        let points = vec![
            ConvergencePoint {
                steps: 50,
                trinomial_price: 10.47,
                blackscholes_price: 10.4506,
            },
            ConvergencePoint {
                steps: 100,
                trinomial_price: 10.46,
                blackscholes_price: 10.4506,
            },
        ];
        let source = Fixed::new(Ok(points));
        let mut sink = Recorder::default();
        let report = pollster::block_on(
            AnalysisOrchestrator::default().activate(Some(&request()), &source, &mut sink),
        );

        assert_eq!(report.convergence, ConvergenceOrigin::Service);
        assert_eq!(convergence_prices(&sink), vec![10.47, 10.46]);
    }

    #[test]
    fn test_sink_failure_does_not_stop_other_charts() {
        let source = Fixed::new(Ok(vec![]));
        let mut sink = Recorder {
            refuse: Some("timing-plot"),
            ..Recorder::default()
        };
        let report = pollster::block_on(
            AnalysisOrchestrator::default().activate(None, &source, &mut sink),
        );

        assert_eq!(report.failed, vec![ChartTarget::Timing]);
        assert_eq!(report.rendered.len(), 3);
        assert!(sink.charts.contains_key("precision-plot"));
        assert!(sink.charts.contains_key("convergence-plot"));
    }
}
