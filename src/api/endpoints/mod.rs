//! API endpoint handlers, one module per front-end feature.

pub mod alerts;
pub mod analysis;
pub mod batch;
pub mod fhir;
pub mod health;
pub mod history;
pub mod suggestions;
