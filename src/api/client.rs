//! Fetch-based client for the pricing service.

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::types::{
    ConvergencePoint, ConvergenceRequest, ConvergenceResponse, PricingOutcome, PricingRequest,
    PricingResponse,
};
use crate::analysis::ConvergenceSource;
use crate::error::ViewError;

const CALCULATE_PATH: &str = "/api/calculate";
const CONVERGENCE_PATH: &str = "/api/convergence";

fn transport(value: JsValue) -> ViewError {
    ViewError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    base_url: String,
}

impl HttpClient {
    /// `base_url` may be empty, for a service on the page's own origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and decode the JSON answer, whatever the status.
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ViewError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let window =
            web_sys::window().ok_or_else(|| ViewError::Transport("no window".to_string()))?;

        let headers = Headers::new().map_err(transport)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(transport)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&serde_json::to_string(body)?));

        let url = self.url(path);
        let request = Request::new_with_str_and_init(&url, &init).map_err(transport)?;
        log::debug!("POST {url}");

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;
        if !response.ok() {
            log::debug!("POST {url} answered {}", response.status());
        }

        let json = JsFuture::from(response.json().map_err(transport)?)
            .await
            .map_err(transport)?;
        Ok(serde_wasm_bindgen::from_value(json)?)
    }

    /// Price an option and validate the answer.
    pub async fn calculate(&self, request: &PricingRequest) -> Result<PricingOutcome, ViewError> {
        let response: PricingResponse = self.post(CALCULATE_PATH, request).await?;
        Ok(response.into_outcome())
    }
}

impl ConvergenceSource for HttpClient {
    async fn convergence(
        &self,
        request: &ConvergenceRequest,
    ) -> Result<Vec<ConvergencePoint>, ViewError> {
        let response: ConvergenceResponse = self.post(CONVERGENCE_PATH, request).await?;
        response.into_series()
    }
}
