//! Trinomial Tree View - WASM Module
//!
//! This module lays out and renders trinomial option-pricing trees as
//! interactive, zoomable diagrams, degrading detail as the tree grows, plus
//! the auxiliary analysis charts. It is compiled to WebAssembly and exposes
//! a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: typed tree payload and a petgraph-backed validated view of it
//! - `layout`: geometry model, level-of-detail policy and step layout engine
//! - `render`: pure scene construction and the SVG surfaces that draw it
//! - `viewport`: pan/zoom transform, reset and auto-fit
//! - `spatial`: R-tree hit testing for pointer hover
//! - `analysis`: synthetic series and convergence chart orchestration
//! - `api`: pricing service types and fetch client
//! - `session`: current pricing result and request ordering
//! - `view`: the redraw/hover/zoom coordinator

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlButtonElement;

pub mod analysis;
pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod render;
pub mod session;
pub mod spatial;
pub mod view;
pub mod viewport;

use analysis::AnalysisOrchestrator;
use api::{HttpClient, PricingRequest};
use bridge::{BusyGuard, BusyState, CallbackSink};
use config::ViewConfig;
use error::ViewError;
use graph::RawTreeData;
use layout::Position;
use render::DomSurface;
use view::TreeView;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Main entry point for the tree view.
///
/// This struct wraps a [`TreeView`] drawing into the page's `<svg>` element
/// and provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct TrinomialTreeView {
    view: Rc<RefCell<TreeView<DomSurface>>>,
    client: HttpClient,
    analysis: AnalysisOrchestrator,
    busy: Rc<BusyState>,
}

#[wasm_bindgen]
impl TrinomialTreeView {
    /// Attach to the page.
    ///
    /// `config` is an optional plain object; see `ViewConfig` for the
    /// fields and their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TrinomialTreeView, JsValue> {
        let config = ViewConfig::from_js(config)?;
        logging::init(config.level_filter());

        let surface = DomSurface::attach(
            &config.svg_element_id,
            &config.container_selector,
            &config.tooltip_class,
        )?;

        Ok(Self {
            client: HttpClient::new(config.api_base_url.clone()),
            analysis: AnalysisOrchestrator::new(config.charts.clone()),
            busy: Rc::new(BusyState::default()),
            view: Rc::new(RefCell::new(TreeView::new(surface, config))),
        })
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Draw a `{nodes, edges, tree_params}` object, replacing the current
    /// drawing.
    ///
    /// Returns a report of what was drawn. Fails without touching the page
    /// when a required part is missing.
    #[wasm_bindgen(js_name = drawTree)]
    pub fn draw_tree(&self, data: JsValue) -> Result<JsValue, JsValue> {
        let raw: RawTreeData = serde_wasm_bindgen::from_value(data).map_err(ViewError::from)?;
        let report = self.view.borrow_mut().draw_raw(raw)?;
        Ok(serde_wasm_bindgen::to_value(&report)?)
    }

    /// Export the current drawing as standalone SVG markup.
    ///
    /// Returns `undefined` when nothing has been drawn yet.
    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> Result<Option<String>, JsValue> {
        Ok(self.view.borrow().export_svg()?)
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Submit a pricing request and redraw with its tree.
    ///
    /// `button` (or the configured calculate button when omitted) is
    /// disabled with a busy label until the request settles. The promise
    /// resolves to `{status}`: "applied", or "stale" when a newer request
    /// was submitted meanwhile, and rejects with the service's message.
    pub fn calculate(&self, request: JsValue, button: Option<HtmlButtonElement>) -> Promise {
        let view = Rc::clone(&self.view);
        let client = self.client.clone();
        let busy = Rc::clone(&self.busy);
        let (selector, busy_label) = {
            let view = self.view.borrow();
            (
                view.config().calculate_button.clone(),
                view.config().busy_label.clone(),
            )
        };
        let button = button.or_else(|| find_button(&selector));

        future_to_promise(async move {
            let request: PricingRequest =
                serde_wasm_bindgen::from_value(request).map_err(ViewError::from)?;
            let _busy = button.map(|button| BusyGuard::engage(button, &busy_label, &busy));

            let token = view.borrow_mut().begin_request();
            log::info!("pricing N={} ({:?})", request.steps, request.option_type);
            let outcome = client.calculate(&request).await?;

            let completion = view.borrow_mut().apply_pricing(token, request, outcome)?;
            Ok(serde_wasm_bindgen::to_value(&completion)?)
        })
    }

    /// Figures of the current pricing result, or `undefined`.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        match self.view.borrow().summary() {
            Some(summary) => Ok(serde_wasm_bindgen::to_value(&summary)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Render the four analysis charts through `render(elementId, spec)`.
    ///
    /// Resolves to a report naming the charts rendered and whether the
    /// convergence data came from the service or the built-in series.
    #[wasm_bindgen(js_name = activateAnalysis)]
    pub fn activate_analysis(&self, render: js_sys::Function) -> Promise {
        let request = self.view.borrow().convergence_request();
        let client = self.client.clone();
        let analysis = self.analysis.clone();

        future_to_promise(async move {
            let mut sink = CallbackSink::new(render);
            let report = analysis.activate(request.as_ref(), &client, &mut sink).await;
            Ok(serde_wasm_bindgen::to_value(&report)?)
        })
    }

    // =========================================================================
    // Viewport & Interaction
    // =========================================================================

    /// Zoom by `factor` around the surface point (x, y).
    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&self, factor: f64, x: f64, y: f64) -> Result<(), JsValue> {
        self.view.borrow_mut().zoom(factor, Position::new(x, y))?;
        Ok(())
    }

    /// Pan by a surface-space offset.
    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.view.borrow_mut().pan(dx, dy)?;
        Ok(())
    }

    /// Show the hover card of the node under a pointer at surface (x, y)
    /// and page (page_x, page_y). Returns whether a node was hit.
    #[wasm_bindgen(js_name = hoverAt)]
    pub fn hover_at(&self, x: f64, y: f64, page_x: f64, page_y: f64) -> Result<bool, JsValue> {
        Ok(self
            .view
            .borrow_mut()
            .hover_at(Position::new(x, y), Position::new(page_x, page_y))?)
    }

    #[wasm_bindgen(js_name = hoverEnd)]
    pub fn hover_end(&self) -> Result<(), JsValue> {
        Ok(self.view.borrow_mut().hover_end()?)
    }
}

fn find_button(selector: &str) -> Option<HtmlButtonElement> {
    web_sys::window()?
        .document()?
        .query_selector(selector)
        .ok()??
        .dyn_into::<HtmlButtonElement>()
        .ok()
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::analysis::{ChartSink, ChartSpec, ConvergenceOrigin, ConvergenceSource};
    use crate::api::{ConvergencePoint, ConvergenceRequest, OptionStyle, OptionType, PricingResponse};
    use crate::graph::{Direction, NodeId, TreeDataset, TreeEdge, TreeNode, TreeParams};
    use crate::render::{MarkupSurface, Primitive};
    use std::collections::HashMap;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Full trinomial tree of depth `n`, ids `"<step>:<row>"`.
    fn trinomial(n: u32) -> TreeDataset {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for step in 0..=n {
            for row in 0..(2 * step + 1) {
                let id = format!("{step}:{row}");
                nodes.push(TreeNode {
                    id: NodeId::new(id.clone()),
                    step,
                    value: 100.0 * 1.05f64.powi(step as i32 - row as i32),
                    option_value: 5.0,
                    payoff: 0.0,
                    prob_up: (step < n).then_some(0.2),
                    prob_mid: (step < n).then_some(0.6),
                    prob_down: (step < n).then_some(0.2),
                });
                if step < n {
                    let children = [
                        (0, Direction::Up, 0.2),
                        (1, Direction::Middle, 0.6),
                        (2, Direction::Down, 0.2),
                    ];
                    for (offset, direction, probability) in children {
                        edges.push(TreeEdge {
                            source: NodeId::new(id.clone()),
                            target: NodeId::new(format!("{}:{}", step + 1, row + offset)),
                            direction,
                            probability: Some(probability),
                        });
                    }
                }
            }
        }
        TreeDataset {
            nodes,
            edges,
            tree_params: TreeParams { n, final_price: 5.0 },
        }
    }

    fn markup_view() -> TreeView<MarkupSurface> {
        init_logging();
        TreeView::new(MarkupSurface::new(1000.0, 600.0), ViewConfig::default())
    }

    #[test]
    fn test_second_draw_replaces_first() {
        let mut view = markup_view();
        view.redraw(trinomial(4)).unwrap();
        assert!(view.surface().contains("node:4:8"));
        assert_eq!(view.surface().primitives().len(), 2 * 48 + 25);

        view.redraw(trinomial(2)).unwrap();
        let surface = view.surface();
        assert_eq!(surface.primitives().len(), 2 * 12 + 9);
        assert!(!surface.contains("node:4:8"));
        assert!(!surface.contains("node:3:0"));
        assert!(surface.primitives().iter().all(|p| {
            let key = p.key();
            !key.contains("3:") && !key.contains("4:")
        }));
    }

    #[test]
    fn test_dangling_edge_is_drawn_from_origin() {
        let mut dataset = trinomial(1);
        dataset.edges.push(TreeEdge {
            source: NodeId::from("ghost"),
            target: NodeId::from("1:0"),
            direction: Direction::Up,
            probability: None,
        });

        let mut view = markup_view();
        let report = view.redraw(dataset).unwrap();
        assert_eq!(report.anomalies, 1);

        let line = view
            .surface()
            .primitives()
            .iter()
            .find_map(|p| match p {
                Primitive::Line(line) if line.key == "edge:ghost->1:0" => Some(line.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(line.from, Position::ORIGIN);
        assert!(view.transform().is_finite());
    }

    #[test]
    fn test_single_node_tree_fits_finitely() {
        let mut view = markup_view();
        let report = view.redraw(trinomial(0)).unwrap();

        let transform = report.transition.unwrap().transform;
        assert!(transform.is_finite());
        assert!(transform.scale > 0.0);

        // the lone node stays on screen
        let node = transform.apply(Position::new(50.0, 300.0));
        assert!((0.0..=1000.0).contains(&node.x));
        assert!((0.0..=600.0).contains(&node.y));
    }

    #[test]
    fn test_oversized_tree_shows_message_only() {
        let mut view = markup_view();
        let report = view.redraw(trinomial(55)).unwrap();

        assert!(!report.rendered);
        assert!(report.transition.is_none());
        assert_eq!(view.surface().primitives().len(), 2);
        let svg = view.surface().to_svg_string();
        assert!(svg.contains("Tree too large for visualization (3136 nodes)"));
        assert!(svg.contains("only visualization is simplified"));
    }

    #[test]
    fn test_hover_card_probabilities_sum_to_hundred() {
        let mut view = markup_view();
        view.redraw(trinomial(3)).unwrap();

        for node in view.dataset().unwrap().nodes.clone() {
            let Some(Primitive::Node(group)) = view
                .surface()
                .primitives()
                .iter()
                .find(|p| p.key() == format!("node:{}", node.id))
            else {
                panic!("node {} not drawn", node.id);
            };
            let card = &group.hover;
            if node.step < 3 {
                assert_eq!(card.probabilities.len(), 3);
                let total: f64 = card.probabilities.iter().map(|p| p.percent).sum();
                assert!((total - 100.0).abs() < 0.1, "{} sums to {total}", node.id);
            } else {
                assert!(card.probabilities.is_empty());
            }
        }
    }

    #[test]
    fn test_level_of_detail_across_sizes() {
        let mut view = markup_view();

        view.redraw(trinomial(25)).unwrap();
        let edge_labels: Vec<&str> = view
            .surface()
            .primitives()
            .iter()
            .filter_map(|p| match p {
                Primitive::Label(label) if label.class == "link-label" => {
                    Some(label.content.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(edge_labels.len(), 3 * 25 * 25);
        assert!(edge_labels.iter().all(|text| text.is_empty()));

        let radius = view
            .surface()
            .primitives()
            .iter()
            .find_map(|p| match p {
                Primitive::Node(node) => Some(node.circle.radius),
                _ => None,
            })
            .unwrap();
        assert!((radius - 6.0).abs() < 1e-9);
    }

    struct Canned(Vec<ConvergencePoint>);

    impl ConvergenceSource for Canned {
        async fn convergence(
            &self,
            _request: &ConvergenceRequest,
        ) -> Result<Vec<ConvergencePoint>, ViewError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Charts(HashMap<String, ChartSpec>);

    impl ChartSink for Charts {
        fn render(&mut self, element_id: &str, spec: &ChartSpec) -> Result<(), ViewError> {
            self.0.insert(element_id.to_string(), spec.clone());
            Ok(())
        }
    }

    #[test]
    fn test_pricing_then_analysis_with_empty_convergence() {
        let mut view = markup_view();
        let request = PricingRequest {
            spot: 100.0,
            strike: 100.0,
            start_date: "2025-01-01".to_string(),
            maturity_date: "2026-01-01".to_string(),
            rate: 0.05,
            volatility: 0.2,
            steps: 2,
            option_type: OptionType::Call,
            option_style: OptionStyle::European,
            dividend: 0.0,
            threshold: 0.0,
            ex_div_date: None,
        };
        let body = serde_json::json!({
            "success": true,
            "data": serde_json::to_value(trinomial(2)).unwrap(),
        });
        let outcome = serde_json::from_value::<PricingResponse>(body)
            .unwrap()
            .into_outcome();

        let token = view.begin_request();
        view.apply_pricing(token, request, outcome).unwrap();
        assert!(view.surface().contains("node:2:4"));

        let mut charts = Charts::default();
        let report = pollster::block_on(AnalysisOrchestrator::default().activate(
            view.convergence_request().as_ref(),
            &Canned(Vec::new()),
            &mut charts,
        ));

        assert_eq!(report.convergence, ConvergenceOrigin::Fallback);
        assert_eq!(charts.0.len(), 4);
        let convergence = &charts.0["convergence-plot"];
        assert_eq!(convergence.traces[0].x.len(), 6);
        assert!(convergence.traces[1].y.iter().all(|&p| p == 10.45));
    }
}
