//! CLI command implementations

pub mod form;
pub mod model;
pub mod predict;

use crate::client::ApiClient;
use valuation_lib::ValuationPredictor;

/// Where predictions come from
pub enum Backend {
    /// Model artifact loaded in this process on first use
    Local(ValuationPredictor),
    /// A running valuation server
    Remote(ApiClient),
}
