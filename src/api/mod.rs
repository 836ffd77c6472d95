//! REST API layer.

pub mod rest;
pub mod types;
