//! HTTP surface for the Wayfarer travel assistant.

pub mod rest;

pub use rest::{ApiError, RestApi};
