//! Boundary with the pricing service.
//!
//! - `types`: request/response shapes and boundary validation
//! - `client`: browser `fetch` client

pub mod client;
pub mod types;

pub use client::HttpClient;
pub use types::{
    ConvergencePoint, ConvergenceRequest, ConvergenceResponse, DateInfo, ExecutionTimes, Greeks,
    OptionInfo, OptionStyle, OptionType, PricingData, PricingOutcome, PricingRequest,
    PricingResponse, PricingResult,
};
