//! Gateway — typed access to the remote row API.
//!
//! `types` defines the wire rows and the [`DataGateway`] seam; `rest` is the
//! production HTTP implementation.

pub mod rest;
pub mod types;

pub use rest::RestGateway;
pub use types::{DataGateway, GatewayError};
