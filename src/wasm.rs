//! WASM bindings for page-curl.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.
//! The host renders; the viewer owns the book state and answers per-frame
//! pose queries.

use crate::export::raw::{export_raw, RawPageData};
use crate::interaction::{Camera, HoverEvent, PointerSource, RayPicker};
use crate::texture::{FaceRasterizer, GlyphBlockRasterizer};
use crate::types::PageSide;
use crate::{BookConfig, BookContent, BookSession, PageGeometry, PageTextures};
use glam::{Vec2, Vec3};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

fn js_err(e: crate::BookError) -> JsError {
    JsError::new(&e.to_string())
}

/// An animated book.
#[wasm_bindgen]
pub struct BookViewer {
    session: BookSession,
    geometry: PageGeometry,
    rasterizer: GlyphBlockRasterizer,
    picker: RayPicker,
    pointer: PointerSource,
    last_hover: Vec<HoverEvent>,
}

#[wasm_bindgen]
impl BookViewer {
    /// Create a viewer from book JSON and an optional config JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(book_json: &str, config_json: Option<String>) -> Result<BookViewer, JsError> {
        let book = BookContent::from_json(book_json).map_err(js_err)?;
        let config = match config_json {
            Some(json) => BookConfig::from_json(&json).map_err(js_err)?,
            None => BookConfig::default(),
        };
        let session = BookSession::new(book, config).map_err(js_err)?;

        Ok(BookViewer {
            geometry: PageGeometry::build(&config.dimensions),
            rasterizer: GlyphBlockRasterizer::new(&config.texture),
            picker: RayPicker::new(Camera::default()),
            pointer: PointerSource::default(),
            last_hover: Vec::new(),
            session,
        })
    }

    /// Get the number of pages.
    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.session.page_count()
    }

    /// Get the number of bones per page.
    #[wasm_bindgen(getter)]
    pub fn bone_count(&self) -> usize {
        self.session.config().dimensions.bone_count()
    }

    // Navigation

    pub fn set_page(&mut self, page: i32) -> usize {
        self.session.set_page(page as i64, js_sys::Date::now())
    }

    pub fn next(&mut self) -> usize {
        self.session.next_page(js_sys::Date::now())
    }

    pub fn previous(&mut self) -> usize {
        self.session.previous_page(js_sys::Date::now())
    }

    #[wasm_bindgen(getter)]
    pub fn current_page(&self) -> usize {
        self.session.cursor().current()
    }

    #[wasm_bindgen(getter)]
    pub fn delayed_page(&self) -> usize {
        self.session.cursor().delayed()
    }

    #[wasm_bindgen(getter)]
    pub fn label(&self) -> String {
        self.session.ui().label
    }

    #[wasm_bindgen(getter)]
    pub fn previous_enabled(&self) -> bool {
        self.session.ui().previous_enabled
    }

    #[wasm_bindgen(getter)]
    pub fn next_enabled(&self) -> bool {
        self.session.ui().next_enabled
    }

    /// Call `callback` with the navigation state as JSON whenever it changes.
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.session.subscribe(move |ui| {
            let json = match serde_json::to_string(ui) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("failed to serialize navigation state: {}", e);
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("navigation listener threw: {:?}", err);
            }
        });
    }

    // Frame

    /// Advance one frame. `delta` is in seconds. Returns true when the
    /// hovered page changed.
    pub fn frame(&mut self, delta: f32) -> bool {
        let now = js_sys::Date::now();
        self.last_hover = self
            .session
            .frame_with_pointer(now, delta, self.pointer, &self.picker);
        !self.last_hover.is_empty()
    }

    // Pointer

    /// Configure the camera used for built-in picking.
    #[allow(clippy::too_many_arguments)]
    pub fn set_camera(
        &mut self,
        px: f32,
        py: f32,
        pz: f32,
        tx: f32,
        ty: f32,
        tz: f32,
        fov_degrees: f32,
        aspect: f32,
    ) {
        self.picker.camera = Camera {
            position: Vec3::new(px, py, pz),
            target: Vec3::new(tx, ty, tz),
            fov_y: fov_degrees.to_radians(),
            aspect,
        };
    }

    /// Pointer position in normalized viewport coordinates, picked on the
    /// next frame. Switches back to built-in picking.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = PointerSource::BuiltIn(Some(Vec2::new(x, y)));
    }

    /// Pointer left the viewport; hover clears on the next frame.
    pub fn pointer_leave(&mut self) {
        self.pointer = PointerSource::BuiltIn(None);
    }

    /// Report a hit from the host's own picking instead of the built-in ray
    /// picker. Frames keep this hover until the next report.
    pub fn pointer_hit(&mut self, page: Option<u32>) -> bool {
        self.pointer = PointerSource::Host;
        self.last_hover = self.session.pointer_moved(page.map(|p| p as usize));
        !self.last_hover.is_empty()
    }

    /// Page under the pointer, if any.
    #[wasm_bindgen(getter)]
    pub fn hovered(&self) -> Option<u32> {
        self.session.hovered().map(|i| i as u32)
    }

    /// Hover changes from the last frame as `[index, entered]` pairs.
    pub fn hover_events(&self) -> Vec<i32> {
        self.last_hover
            .iter()
            .flat_map(|event| match *event {
                HoverEvent::Leave(i) => [i as i32, 0],
                HoverEvent::Enter(i) => [i as i32, 1],
            })
            .collect()
    }

    /// Click the hovered page. Returns the selected page.
    pub fn click(&mut self) -> Option<u32> {
        self.session.click(js_sys::Date::now()).map(|i| i as u32)
    }

    // Pose

    /// Local bone angles of a page as `[y, x]` pairs.
    pub fn bone_angles(&self, index: usize) -> Vec<f32> {
        self.session
            .page(index)
            .map(|page| page.bone_angles().iter().flat_map(|a| [a.y, a.x]).collect())
            .unwrap_or_default()
    }

    /// Column-major world matrices of a page's bones.
    pub fn bone_matrices(&self, index: usize) -> Vec<f32> {
        self.session
            .bone_matrices(index)
            .map(|bones| bones.iter().flat_map(|m| m.to_cols_array()).collect())
            .unwrap_or_default()
    }

    pub fn page_z(&self, index: usize) -> f32 {
        self.session.page(index).map_or(0.0, |page| page.z)
    }

    pub fn page_emissive(&self, index: usize) -> f32 {
        self.session.page(index).map_or(0.0, |page| page.emissive)
    }

    // Assets

    /// Shared page geometry.
    pub fn geometry(&self) -> PageGeometryData {
        PageGeometryData {
            raw: export_raw(&self.geometry),
        }
    }

    /// PNG of one face of a page.
    pub fn face_png(&self, index: usize, back: bool) -> Result<Vec<u8>, JsError> {
        let book = self.session.book();
        let page = book
            .pages
            .get(index)
            .ok_or_else(|| JsError::new(&format!("page {} out of range", index)))?;
        let side = if back { PageSide::Back } else { PageSide::Front };
        let texture = self
            .rasterizer
            .rasterize(page.text(side), book.face_style(index, side))
            .map_err(js_err)?;
        texture.to_png().map_err(js_err)
    }

    /// GLB of one page in its current pose, textured.
    pub fn page_glb(&self, index: usize) -> Result<Vec<u8>, JsError> {
        let book = self.session.book();
        let page = self
            .session
            .page(index)
            .ok_or_else(|| JsError::new(&format!("page {} out of range", index)))?;
        let content = &book.pages[index];
        let mut faces = Vec::with_capacity(2);
        for side in PageSide::all() {
            faces.push(
                self.rasterizer
                    .rasterize(content.text(side), book.face_style(index, side))
                    .map_err(js_err)?,
            );
        }
        let back = faces.pop();
        let front = faces.pop();
        let textures = front.zip(back).map(|(front, back)| PageTextures { front, back });
        crate::export_page_glb(&self.geometry, textures.as_ref(), Some(page)).map_err(js_err)
    }
}

/// Flat page geometry arrays.
#[wasm_bindgen]
pub struct PageGeometryData {
    raw: RawPageData,
}

#[wasm_bindgen]
impl PageGeometryData {
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Vec<f32> {
        self.raw.positions_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> Vec<f32> {
        self.raw.normals_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Vec<f32> {
        self.raw.uvs_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn joints(&self) -> Vec<u16> {
        self.raw.joints_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn weights(&self) -> Vec<f32> {
        self.raw.weights_flat()
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        self.raw.indices.clone()
    }

    /// `[start, count]` index ranges: outer edge, spine edge, top, bottom,
    /// front, back.
    #[wasm_bindgen(getter)]
    pub fn groups(&self) -> Vec<u32> {
        self.raw.groups_flat()
    }

    /// Column-major inverse bind matrices.
    #[wasm_bindgen(getter)]
    pub fn inverse_bind(&self) -> Vec<f32> {
        self.raw.inverse_bind.iter().flat_map(|m| m.iter().copied()).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.raw.vertex_count()
    }
}
