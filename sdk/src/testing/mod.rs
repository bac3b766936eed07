//! Testing utilities for code built on the Flowpilot client.
//!
//! - [`MockTransport`] - scripted engine responses with request recording
//! - [`fixtures`] - JSON builders for common engine entities

pub mod fixtures;
mod mock_transport;

pub use mock_transport::MockTransport;
