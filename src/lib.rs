pub mod api;
pub mod config;
pub mod cost;
mod csv_utils;
pub mod dto;
mod error;
pub mod handler;
pub mod payment;
mod runner;
pub mod server;
pub mod state;
pub mod stores;

pub use cost::{calculate_cost, PricingModel};
pub use dto::{Quote, QuoteRequest};
pub use error::Error;
pub use handler::{handler, ApiRequest, Context, Failure, HandlerResponse, HandlerResult};
pub use runner::{run, run_async};
