//! Backend of the `iconc` icon font compiler.
pub mod document;
pub mod encode;
pub mod error;
mod sfnt;
pub mod svgfont;
pub mod ttf;
pub mod woff;
pub mod woff2;
