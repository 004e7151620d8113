//! The tree view: one drawing surface and the state that drives it.
//!
//! Every redraw runs the same sequence: reset the viewport (which clears
//! the surface), validate, lay out, build the scene, draw, auto-fit, and
//! index the drawn nodes for pointer hit testing. Nothing from a previous
//! dataset survives a redraw.

use serde::Serialize;

use crate::api::{ConvergenceRequest, PricingOutcome, PricingRequest};
use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::graph::{RawTreeData, TreeDataset, TreeGraph};
use crate::layout::{Position, StepLayout};
use crate::render::{DrawSurface, HoverCard, MarkupSurface, OverlayState, build_scene};
use crate::session::{Completion, PricingSummary, RequestToken, Session};
use crate::spatial::SpatialIndex;
use crate::viewport::{Size, Transition, ViewportController, ViewportTransform};

/// Outcome of a redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawReport {
    pub steps: u32,
    pub nodes: usize,
    pub edges: usize,
    /// False when the tree was replaced by the size message.
    pub rendered: bool,
    pub anomalies: usize,
    pub transition: Option<Transition>,
}

/// A hit-testable node of the current drawing.
#[derive(Debug, Clone)]
struct HoverTarget {
    card: HoverCard,
    radius: f64,
}

pub struct TreeView<S: DrawSurface> {
    surface: S,
    config: ViewConfig,
    layout: StepLayout,
    viewport: ViewportController,
    session: Session,
    overlay: OverlayState,
    index: SpatialIndex,
    targets: Vec<HoverTarget>,
    dataset: Option<TreeDataset>,
}

impl<S: DrawSurface> TreeView<S> {
    pub fn new(surface: S, config: ViewConfig) -> Self {
        Self {
            surface,
            layout: StepLayout::new(config.layout.clone(), config.detail.clone()),
            viewport: ViewportController::new(config.viewport.clone()),
            config,
            session: Session::new(),
            overlay: OverlayState::default(),
            index: SpatialIndex::new(),
            targets: Vec::new(),
            dataset: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    /// Dataset of the last redraw.
    pub fn dataset(&self) -> Option<&TreeDataset> {
        self.dataset.as_ref()
    }

    /// Validate an unchecked payload and redraw. An invalid payload leaves
    /// the surface and viewport untouched.
    pub fn draw_raw(&mut self, raw: RawTreeData) -> Result<DrawReport, ViewError> {
        let dataset = TreeDataset::try_from(raw).inspect_err(|err| {
            log::error!("draw aborted: {err}");
        })?;
        self.redraw(dataset)
    }

    /// Replace whatever is drawn with `dataset`.
    pub fn redraw(&mut self, dataset: TreeDataset) -> Result<DrawReport, ViewError> {
        self.viewport.reset(&mut self.surface)?;
        self.overlay.hide();
        self.index.clear();
        self.targets.clear();

        let graph = TreeGraph::build(&dataset);
        let anomalies = graph.anomalies();
        for anomaly in &anomalies {
            log::warn!("tree anomaly: {anomaly}");
        }

        let frame = self.frame_size();
        let layout = self.layout.compute(&graph, frame.width, frame.height);
        let scene = build_scene(&graph, &layout);
        self.surface.draw(&scene)?;

        // the size message is shown as laid out, without zooming
        let transition = match scene.bounds() {
            Some(bounds) if layout.profile.render => {
                Some(self.viewport.auto_fit(bounds, &mut self.surface)?)
            }
            _ => None,
        };

        self.targets = scene
            .nodes()
            .map(|node| HoverTarget {
                card: node.hover.clone(),
                radius: node.circle.radius,
            })
            .collect();
        self.index
            .rebuild(scene.nodes().enumerate().map(|(slot, node)| (slot, node.translate)));

        let report = DrawReport {
            steps: dataset.depth(),
            nodes: dataset.nodes.len(),
            edges: dataset.edges.len(),
            rendered: layout.profile.render,
            anomalies: anomalies.len(),
            transition,
        };
        log::info!(
            "drew N={} ({} nodes, {} edges{})",
            report.steps,
            report.nodes,
            report.edges,
            if report.rendered { "" } else { ", message only" }
        );

        self.dataset = Some(dataset);
        Ok(report)
    }

    /// Container size, or the configured frame when the container has none.
    fn frame_size(&self) -> Size {
        let size = self.surface.size();
        if size.width > 0.0 && size.height > 0.0 {
            size
        } else {
            log::debug!("container has no size, laying out in the configured frame");
            Size::new(self.config.frame_width, self.config.frame_height)
        }
    }

    /// Show the hover card of the node under the pointer, if any.
    ///
    /// `screen` is the pointer in surface coordinates, `page` in page
    /// coordinates (where the overlay is anchored).
    pub fn hover_at(&mut self, screen: Position, page: Position) -> Result<bool, ViewError> {
        let world = self.viewport.to_world(screen);
        let max_radius = self
            .targets
            .iter()
            .map(|t| t.radius)
            .fold(0.0, f64::max);

        let hit = self
            .index
            .nearest_within(world, max_radius)
            .and_then(|slot| self.targets.get(slot));
        match hit {
            Some(target) => {
                let card = target.card.clone();
                let overlay = self.overlay.show(card, page);
                self.surface.show_overlay(overlay)?;
                Ok(true)
            }
            None => {
                self.hover_end()?;
                Ok(false)
            }
        }
    }

    /// Remove the hover card, including one raised by the surface's own
    /// pointer listeners.
    pub fn hover_end(&mut self) -> Result<(), ViewError> {
        self.overlay.hide();
        self.surface.hide_overlay()
    }

    /// Zoom around a surface point, applied immediately.
    pub fn zoom(&mut self, factor: f64, anchor: Position) -> Result<ViewportTransform, ViewError> {
        let transform = self.viewport.zoom_by(factor, anchor);
        self.surface.set_transform(transform, 0)?;
        Ok(transform)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<ViewportTransform, ViewError> {
        let transform = self.viewport.pan_by(dx, dy);
        self.surface.set_transform(transform, 0)?;
        Ok(transform)
    }

    /// Register a pricing submission.
    pub fn begin_request(&mut self) -> RequestToken {
        self.session.begin_request()
    }

    /// Apply the answer to a submission: redraw on success, report the
    /// service's message on rejection, ignore it when a newer submission
    /// exists.
    pub fn apply_pricing(
        &mut self,
        token: RequestToken,
        request: PricingRequest,
        outcome: PricingOutcome,
    ) -> Result<Completion, ViewError> {
        match self.session.complete(token, request, outcome) {
            Completion::Applied => {
                let dataset = self
                    .session
                    .current()
                    .map(|current| current.result.dataset.clone())
                    .ok_or(ViewError::MissingField("data"))?;
                self.redraw(dataset)?;
                Ok(Completion::Applied)
            }
            Completion::Rejected(message) => Err(ViewError::Rejected(message)),
            Completion::Stale => Ok(Completion::Stale),
        }
    }

    pub fn summary(&self) -> Option<PricingSummary> {
        self.session.summary()
    }

    pub fn convergence_request(&self) -> Option<ConvergenceRequest> {
        self.session.convergence_request()
    }

    /// Render the current dataset to SVG markup at the surface's size.
    pub fn export_svg(&self) -> Result<Option<String>, ViewError> {
        let Some(dataset) = self.dataset.clone() else {
            return Ok(None);
        };
        let size = self.surface.size();
        let mut export = TreeView::new(MarkupSurface::new(size.width, size.height), self.config.clone());
        export.redraw(dataset)?;
        Ok(Some(export.surface().to_svg_string()))
    }
}
