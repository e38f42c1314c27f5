//! Intermediate representation for icon font compilation.
//!
//! Holds the glyph model shared by the front and back end, the persisted
//! manifest, and the svg processing that turns designer output into
//! uniform, fill-only outlines.

pub mod allocate;
pub mod catalog;
pub mod changelog;
pub mod error;
pub mod font;
pub mod glyph;
pub mod manifest;
pub mod optimize;
pub mod outline;
pub mod pathdata;
pub mod paths;
pub mod reconcile;
pub mod svg;
pub mod transform;
pub mod types;
