//! Web handlers module
//!
//! Thin HTTP handlers; the work happens in the analysis service and the
//! export renderers.

pub mod analyze;
pub mod export;
pub mod health;
pub mod index;
pub mod static_assets;
