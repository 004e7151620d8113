//! Viewport controller: the pan/zoom transform of the tree surface.
//!
//! The controller is the only writer of the transform. Every new dataset
//! starts with [`ViewportController::reset`], which clears the surface and
//! returns to identity, and ends with [`ViewportController::auto_fit`], which
//! frames the drawn extent with an animated transition. User pan/zoom only
//! moves the transform, never the geometry underneath it.

use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::layout::Position;
use crate::render::DrawSurface;

/// Affine pan/zoom transform: `screen = world * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// World → screen.
    pub fn apply(&self, point: Position) -> Position {
        Position::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }

    /// Screen → world.
    pub fn invert(&self, point: Position) -> Position {
        Position::new(
            (point.x - self.translate_x) / self.scale,
            (point.y - self.translate_y) / self.scale,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.translate_x.is_finite() && self.translate_y.is_finite() && self.scale.is_finite()
    }

    /// SVG `transform` attribute form.
    pub fn svg_attribute(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Size of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned extent of drawn content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Zero-size bounds at a point.
    pub fn at(point: Position) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Grow to contain a rectangle given by its corners.
    pub fn include(&mut self, min: Position, max: Position) {
        let x0 = self.x.min(min.x);
        let y0 = self.y.min(min.y);
        let x1 = (self.x + self.width).max(max.x);
        let y1 = (self.y + self.height).max(max.y);
        *self = Bounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        };
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Configuration of the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Smallest scale reachable by user zoom (default: 0.1).
    pub min_scale: f64,
    /// Largest scale reachable by user zoom (default: 3.0).
    pub max_scale: f64,
    /// Share of the viewport the fitted tree may use (default: 0.8).
    pub fit_padding: f64,
    /// Duration of the auto-fit transition in milliseconds (default: 750).
    pub transition_ms: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 3.0,
            fit_padding: 0.8,
            transition_ms: 750,
        }
    }
}

/// A transform to reach over a bounded duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub transform: ViewportTransform,
    pub duration_ms: u32,
}

/// Owner of the viewport transform.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    config: ViewportConfig,
    transform: ViewportTransform,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            transform: ViewportTransform::IDENTITY,
        }
    }

    /// Current transform.
    #[inline]
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    /// Clear the surface and return to identity without animation.
    pub fn reset<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) -> Result<(), ViewError> {
        surface.clear()?;
        self.transform = ViewportTransform::IDENTITY;
        surface.set_transform(self.transform, 0)
    }

    /// Transform that centres `bounds` in `viewport` at `fit_padding` of the
    /// largest scale that fits.
    ///
    /// Dimensions of zero size are left out of the ratio; when both are
    /// zero the scale stays at 1.0, so the result is always finite.
    pub fn fit(&self, bounds: Bounds, viewport: Size) -> Transition {
        let ratios = [
            (viewport.width, bounds.width),
            (viewport.height, bounds.height),
        ];
        let fitted = ratios
            .iter()
            .filter(|(_, extent)| extent.is_finite() && *extent > f64::EPSILON)
            .map(|(available, extent)| available / extent)
            .fold(f64::INFINITY, f64::min);

        let scale = if fitted.is_finite() && fitted > 0.0 {
            fitted * self.config.fit_padding
        } else {
            1.0
        };

        let center = bounds.center();
        let transform = ViewportTransform {
            translate_x: viewport.width / 2.0 - scale * center.x,
            translate_y: viewport.height / 2.0 - scale * center.y,
            scale,
        };

        Transition {
            transform,
            duration_ms: self.config.transition_ms,
        }
    }

    /// Fit `bounds` into the surface and animate towards it.
    pub fn auto_fit<S: DrawSurface + ?Sized>(
        &mut self,
        bounds: Bounds,
        surface: &mut S,
    ) -> Result<Transition, ViewError> {
        let transition = self.fit(bounds, surface.size());
        if !transition.transform.is_finite() {
            log::warn!("auto-fit produced a non-finite transform, keeping identity");
            return Ok(Transition {
                transform: self.transform,
                duration_ms: 0,
            });
        }

        log::debug!(
            "auto-fit: scale={:.2}, translate=[{:.1}, {:.1}]",
            transition.transform.scale,
            transition.transform.translate_x,
            transition.transform.translate_y
        );
        self.transform = transition.transform;
        surface.set_transform(self.transform, transition.duration_ms)?;
        Ok(transition)
    }

    /// Move the view by a screen-space offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> ViewportTransform {
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
        self.transform
    }

    /// Multiply the scale by `factor`, clamped to the configured range,
    /// keeping the screen point `anchor` fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Position) -> ViewportTransform {
        if !factor.is_finite() || factor <= 0.0 {
            return self.transform;
        }

        let world = self.transform.invert(anchor);
        let scale = (self.transform.scale * factor)
            .clamp(self.config.min_scale, self.config.max_scale);

        self.transform = ViewportTransform {
            translate_x: anchor.x - world.x * scale,
            translate_y: anchor.y - world.y * scale,
            scale,
        };
        self.transform
    }

    /// Screen → world through the current transform.
    pub fn to_world(&self, screen: Position) -> Position {
        self.transform.invert(screen)
    }
}
