//! JavaScript-side helpers used by the façade.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::HtmlButtonElement;

use crate::analysis::{ChartSink, ChartSpec};
use crate::error::ViewError;

/// Forwards chart specs to a JS callback `(elementId, spec) => void`.
pub struct CallbackSink {
    callback: js_sys::Function,
}

impl CallbackSink {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl ChartSink for CallbackSink {
    fn render(&mut self, element_id: &str, spec: &ChartSpec) -> Result<(), ViewError> {
        let spec = serde_wasm_bindgen::to_value(spec)?;
        self.callback
            .call2(&JsValue::NULL, &JsValue::from_str(element_id), &spec)?;
        Ok(())
    }
}

/// Requests in flight and the label the control had before the first.
#[derive(Debug, Default)]
pub struct BusyState {
    pending: Cell<usize>,
    label: RefCell<Option<String>>,
}

/// Disables a button and shows a busy label until the last guard sharing
/// its `BusyState` is dropped.
pub struct BusyGuard {
    button: HtmlButtonElement,
    state: Rc<BusyState>,
}

impl BusyGuard {
    pub fn engage(button: HtmlButtonElement, busy_label: &str, state: &Rc<BusyState>) -> Self {
        if state.pending.get() == 0 {
            *state.label.borrow_mut() = button.text_content();
        }
        state.pending.set(state.pending.get() + 1);
        button.set_disabled(true);
        button.set_text_content(Some(busy_label));
        Self {
            button,
            state: Rc::clone(state),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let pending = self.state.pending.get().saturating_sub(1);
        self.state.pending.set(pending);
        if pending == 0 {
            let label = self.state.label.borrow_mut().take();
            self.button.set_text_content(label.as_deref());
            self.button.set_disabled(false);
        }
    }
}
