//! QR code rendering and export.
//!
//! Everything here is synchronous and free of I/O: [`render`] turns a URL
//! into a raster, [`to_png`] and [`to_pdf`] encode that raster for download.

pub mod error;
pub mod export;
pub mod render;

pub use error::{QrError, Result};
pub use export::{export_file_name, to_pdf, to_png, ExportFormat};
pub use render::{render, ErrorCorrection, RenderOptions, RenderedQr};
