//! Rendering of a laid-out tree.
//!
//! - `command`: draw primitives and the [`Scene`] that orders them
//! - `pipeline`: pure construction of a scene from a tree and its layout
//! - `overlay`: hover card content and the single-overlay rule
//! - `markup`: headless surface producing an SVG document
//! - `dom`: browser surface writing into the page's `<svg>` element
//!
//! Surfaces implement [`DrawSurface`]; nothing above this module knows
//! whether it talks to a DOM or builds a string.

pub mod command;
pub mod dom;
pub mod markup;
pub mod overlay;
pub mod pipeline;

pub use command::{Circle, Color, Label, Line, NodeGroup, Primitive, Scene, TextAnchor, palette};
pub use dom::DomSurface;
pub use markup::MarkupSurface;
pub use overlay::{HoverCard, Overlay, OverlayState};
pub use pipeline::build_scene;

use crate::error::ViewError;
use crate::viewport::{Size, ViewportTransform};

/// Something a [`Scene`] can be drawn on.
pub trait DrawSurface {
    /// Visible size of the surface.
    fn size(&self) -> Size;

    /// Remove every drawn primitive and any overlay.
    fn clear(&mut self) -> Result<(), ViewError>;

    /// Append the primitives of `scene`, in order.
    fn draw(&mut self, scene: &Scene) -> Result<(), ViewError>;

    /// Apply the viewport transform, animated over `duration_ms`
    /// (0 = immediately).
    fn set_transform(&mut self, transform: ViewportTransform, duration_ms: u32)
    -> Result<(), ViewError>;

    /// Show `overlay`, replacing any visible one.
    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), ViewError>;

    fn hide_overlay(&mut self) -> Result<(), ViewError>;
}
