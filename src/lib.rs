//! # Page Curl
//!
//! A Rust library for animating the pages of a 3D book.
//!
//! ## Overview
//!
//! Every page is a thin box bent by a chain of bones. Each frame, the bones
//! ease toward a target pose that depends on whether the page is opened, how
//! long ago it started turning and whether the whole book is closed. A cursor
//! tracks the selected page and steps a delayed page toward it one page at a
//! time, so a long jump flips pages in sequence.
//!
//! ## Quick Start
//!
//! ```ignore
//! use page_curl::{BookContent, BookConfig, BookSession, RayPicker, Camera};
//!
//! let book = BookContent::from_json(include_str!("book.json"))?;
//! let mut session = BookSession::new(book, BookConfig::default())?;
//!
//! // Navigate
//! session.set_page(5, now_ms);
//!
//! // Once per rendered frame
//! let picker = RayPicker::new(Camera::default());
//! let hover = session.tick(now_ms, delta, pointer, &picker);
//!
//! // Pose for the renderer
//! for page in session.pages() {
//!     let bones = session.bone_matrices(page.index());
//! }
//! ```
//!
//! ## Assets
//!
//! The page mesh, face textures and a skinned GLB can be produced without a
//! session:
//!
//! ```ignore
//! use page_curl::{PageGeometry, GlyphBlockRasterizer, render_book_faces, export_page_glb};
//!
//! let geometry = PageGeometry::build(&config.dimensions);
//! let faces = render_book_faces(&book, &GlyphBlockRasterizer::new(&config.texture))?;
//! let glb = export_page_glb(&geometry, Some(&faces[0]), None)?;
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod geometry;
pub mod page;
pub mod session;
pub mod interaction;
pub mod texture;
pub mod export;

// Re-export main types for convenience
pub use error::{BookError, Result};
pub use types::{BookContent, BoneAngle, BoundingBox, FaceStyle, PageContent, PageSide};
pub use config::{BookConfig, CatchUpTiming, PageDimensions, PageTuning, TextureConfig};
pub use geometry::{Mesh, PageFace, PageGeometry, Vertex};
pub use page::{PageFrame, PageState};
pub use session::{BookCursor, BookSession, NavigationUi, PendingStep};
pub use interaction::{Camera, HoverEvent, NoPicker, PagePicker, PointerSource, Ray, RayPicker};
pub use texture::{render_book_faces, FaceRasterizer, GlyphBlockRasterizer, PageTextures, TextureData};
pub use export::gltf::export_page_glb;
pub use export::raw::{export_raw, RawPageData};

/// Load book content from a JSON file.
pub fn load_book<P: AsRef<std::path::Path>>(path: P) -> Result<BookContent> {
    let json = std::fs::read_to_string(path)?;
    BookContent::from_json(&json)
}

/// Load a book configuration from a JSON file.
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<BookConfig> {
    let json = std::fs::read_to_string(path)?;
    BookConfig::from_json(&json)
}

#[cfg(feature = "wasm")]
pub mod wasm;
