//! Episodic-media catalog core.
//!
//! Owns the performance allocation engine (time codec, intervals, placement
//! and completeness), the category membership validator, the lifecycle gate
//! and the [`store::CatalogStore`] persistence contract. No SQL, no HTTP.

pub mod catalog;
pub mod category;
pub mod completeness;
pub mod error;
pub mod interval;
pub mod lifecycle;
pub mod model;
pub mod pagination;
pub mod placement;
pub mod settings;
pub mod store;
pub mod timecode;
pub mod types;
