//! Browser surface writing SVG elements into the page.
//!
//! All primitives live under one root `<g>` appended to the configured
//! `<svg>` element; the viewport transform is a CSS transform on that group.
//! Node groups get `mouseover`/`mouseout` listeners that drive a tooltip
//! `<div>` on `body`. The listener closures are owned by the surface and
//! dropped on [`DrawSurface::clear`], after their elements are gone.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use super::command::{Label, Line, NodeGroup, Primitive, Scene};
use super::overlay::{HoverCard, Overlay};
use super::DrawSurface;
use crate::error::ViewError;
use crate::layout::Position;
use crate::viewport::{Size, ViewportTransform};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

type Listener = Closure<dyn FnMut(MouseEvent)>;

/// The single tooltip element, shared with the hover listeners.
#[derive(Clone)]
struct TooltipSlot {
    document: Document,
    class: Rc<str>,
    element: Rc<RefCell<Option<Element>>>,
}

impl TooltipSlot {
    fn show(&self, overlay: &Overlay) -> Result<(), JsValue> {
        self.hide()?;

        let tooltip = self.document.create_element("div")?;
        tooltip.set_class_name(&self.class);
        for (index, line) in overlay.card.lines().into_iter().enumerate() {
            let row = self
                .document
                .create_element(if index == 0 { "strong" } else { "div" })?;
            row.set_text_content(Some(&line));
            tooltip.append_child(&row)?;
        }

        let style = tooltip.dyn_ref::<HtmlElement>().map(HtmlElement::style);
        if let Some(style) = style {
            style.set_property("position", "absolute")?;
            style.set_property("left", &format!("{}px", overlay.anchor.x))?;
            style.set_property("top", &format!("{}px", overlay.anchor.y))?;
            style.set_property("pointer-events", "none")?;
            style.set_property("opacity", "1")?;
        }

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&tooltip)?;
        *self.element.borrow_mut() = Some(tooltip);
        Ok(())
    }

    fn hide(&self) -> Result<(), JsValue> {
        if let Some(tooltip) = self.element.borrow_mut().take() {
            tooltip.remove();
        }
        Ok(())
    }
}

/// SVG DOM drawing surface.
pub struct DomSurface {
    document: Document,
    container: Element,
    root: Element,
    tooltip: TooltipSlot,
    listeners: Vec<Listener>,
}

impl DomSurface {
    /// Attach to the `<svg id=svg_id>` element.
    ///
    /// The visible size is read from the first element matching
    /// `container_selector`, or from the `<svg>` itself when none matches.
    pub fn attach(
        svg_id: &str,
        container_selector: &str,
        tooltip_class: &str,
    ) -> Result<Self, ViewError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ViewError::NoSurface("no window document".to_string()))?;

        let svg = document
            .get_element_by_id(svg_id)
            .ok_or_else(|| ViewError::NoSurface(format!("#{svg_id}")))?;
        let container = document
            .query_selector(container_selector)?
            .unwrap_or_else(|| svg.clone());

        while let Some(child) = svg.first_child() {
            svg.remove_child(&child)?;
        }
        let root = document.create_element_ns(Some(SVG_NS), "g")?;
        root.set_attribute("class", "viewport")?;
        svg.append_child(&root)?;

        log::info!("attached to #{svg_id}");
        Ok(Self {
            tooltip: TooltipSlot {
                document: document.clone(),
                class: Rc::from(tooltip_class),
                element: Rc::new(RefCell::new(None)),
            },
            document,
            container,
            root,
            listeners: Vec::new(),
        })
    }

    fn svg_element(&self, tag: &str) -> Result<Element, JsValue> {
        self.document.create_element_ns(Some(SVG_NS), tag)
    }

    fn line(&self, line: &Line) -> Result<Element, JsValue> {
        let element = self.svg_element("line")?;
        element.set_attribute("data-key", &line.key)?;
        element.set_attribute("class", line.class)?;
        element.set_attribute("x1", &line.from.x.to_string())?;
        element.set_attribute("y1", &line.from.y.to_string())?;
        element.set_attribute("x2", &line.to.x.to_string())?;
        element.set_attribute("y2", &line.to.y.to_string())?;
        element.set_attribute("stroke", &line.color.hex())?;
        element.set_attribute("stroke-width", &line.width.to_string())?;
        element.set_attribute("stroke-opacity", &line.opacity.to_string())?;
        Ok(element)
    }

    fn text(&self, label: &Label) -> Result<Element, JsValue> {
        let element = self.svg_element("text")?;
        element.set_attribute("data-key", &label.key)?;
        element.set_attribute("class", label.class)?;
        element.set_attribute("x", &label.position.x.to_string())?;
        element.set_attribute("y", &label.position.y.to_string())?;
        element.set_attribute("dy", &label.dy.to_string())?;
        element.set_attribute("font-size", &format!("{}px", label.font_size))?;
        element.set_attribute("font-weight", &label.font_weight.to_string())?;
        element.set_attribute("fill", &label.color.hex())?;
        element.set_attribute("text-anchor", label.anchor.as_str())?;
        element.set_text_content(Some(&label.content));
        Ok(element)
    }

    fn node(&mut self, node: &NodeGroup) -> Result<Element, JsValue> {
        let group = self.svg_element("g")?;
        group.set_attribute("data-key", &node.key)?;
        group.set_attribute("class", node.class)?;
        group.set_attribute(
            "transform",
            &format!("translate({},{})", node.translate.x, node.translate.y),
        )?;

        let circle = self.svg_element("circle")?;
        circle.set_attribute("cx", &node.circle.center.x.to_string())?;
        circle.set_attribute("cy", &node.circle.center.y.to_string())?;
        circle.set_attribute("r", &node.circle.radius.to_string())?;
        circle.set_attribute("fill", &node.circle.fill.hex())?;
        circle.set_attribute("stroke", &node.circle.stroke.hex())?;
        circle.set_attribute("stroke-width", &node.circle.stroke_width.to_string())?;
        group.append_child(&circle)?;

        for label in &node.labels {
            let text = self.text(label)?;
            group.append_child(&text)?;
        }

        self.listen(&group, node.hover.clone())?;
        Ok(group)
    }

    fn listen(&mut self, group: &Element, card: HoverCard) -> Result<(), JsValue> {
        let slot = self.tooltip.clone();
        let over = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |event: MouseEvent| {
            let pointer = Position::new(f64::from(event.page_x()), f64::from(event.page_y()));
            let overlay = Overlay::at_pointer(card.clone(), pointer);
            if let Err(err) = slot.show(&overlay) {
                log::warn!("tooltip failed: {err:?}");
            }
        }));
        group.add_event_listener_with_callback("mouseover", over.as_ref().unchecked_ref())?;

        let slot = self.tooltip.clone();
        let out = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_event: MouseEvent| {
            if let Err(err) = slot.hide() {
                log::warn!("tooltip removal failed: {err:?}");
            }
        }));
        group.add_event_listener_with_callback("mouseout", out.as_ref().unchecked_ref())?;

        self.listeners.push(over);
        self.listeners.push(out);
        Ok(())
    }

    fn draw_primitive(&mut self, primitive: &Primitive) -> Result<(), JsValue> {
        let element = match primitive {
            Primitive::Line(line) => self.line(line)?,
            Primitive::Label(label) => self.text(label)?,
            Primitive::Node(node) => self.node(node)?,
        };
        self.root.append_child(&element)?;
        Ok(())
    }
}

impl DrawSurface for DomSurface {
    fn size(&self) -> Size {
        Size::new(
            f64::from(self.container.client_width()),
            f64::from(self.container.client_height()),
        )
    }

    fn clear(&mut self) -> Result<(), ViewError> {
        while let Some(child) = self.root.first_child() {
            self.root.remove_child(&child)?;
        }
        self.listeners.clear();
        self.tooltip.hide()?;
        Ok(())
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), ViewError> {
        for primitive in &scene.primitives {
            self.draw_primitive(primitive)?;
        }
        log::debug!(
            "dom: {} primitives, {} listeners",
            scene.len(),
            self.listeners.len()
        );
        Ok(())
    }

    fn set_transform(
        &mut self,
        transform: ViewportTransform,
        duration_ms: u32,
    ) -> Result<(), ViewError> {
        let style = format!(
            "transform: translate({}px, {}px) scale({}); transform-origin: 0 0; \
             transition: transform {}ms ease-in-out",
            transform.translate_x, transform.translate_y, transform.scale, duration_ms
        );
        self.root.set_attribute("style", &style)?;
        Ok(())
    }

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), ViewError> {
        Ok(self.tooltip.show(overlay)?)
    }

    fn hide_overlay(&mut self) -> Result<(), ViewError> {
        Ok(self.tooltip.hide()?)
    }
}
