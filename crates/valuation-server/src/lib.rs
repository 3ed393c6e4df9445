//! Valuation service: HTTP surface for the property valuation form

pub mod api;
pub mod config;
