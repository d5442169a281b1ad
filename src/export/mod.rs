//! Page export formats.
//!
//! GLB for asset pipelines and raw flat arrays for custom renderers.

pub mod gltf;
pub mod raw;

pub use gltf::export_page_glb;
pub use raw::{export_raw, RawPageData};
