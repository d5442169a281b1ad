//! Raw page data export for custom rendering.

use crate::geometry::skeleton;
use crate::geometry::{FaceGroup, PageGeometry};

/// Raw skinned page data for custom use.
#[derive(Debug)]
pub struct RawPageData {
    /// Vertex positions (3 floats per vertex).
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (3 floats per vertex).
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (2 floats per vertex).
    pub uvs: Vec<[f32; 2]>,
    /// Bone indices (4 per vertex).
    pub joints: Vec<[u16; 4]>,
    /// Bone weights (4 per vertex).
    pub weights: Vec<[f32; 4]>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Index ranges per face.
    pub groups: Vec<FaceGroup>,
    /// Column-major inverse bind matrix per bone.
    pub inverse_bind: Vec<[f32; 16]>,
}

/// Export page geometry as raw data.
pub fn export_raw(geometry: &PageGeometry) -> RawPageData {
    let mesh = &geometry.mesh;

    RawPageData {
        positions: mesh.vertices.iter().map(|v| v.position).collect(),
        normals: mesh.vertices.iter().map(|v| v.normal).collect(),
        uvs: mesh.vertices.iter().map(|v| v.uv).collect(),
        joints: mesh.vertices.iter().map(|v| v.joints).collect(),
        weights: mesh.vertices.iter().map(|v| v.weights).collect(),
        indices: mesh.indices.clone(),
        groups: geometry.groups.clone(),
        inverse_bind: skeleton::inverse_bind_matrices(&geometry.dimensions)
            .iter()
            .map(|m| m.to_cols_array())
            .collect(),
    }
}

impl RawPageData {
    /// Get positions as a flat array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Get normals as a flat array.
    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.iter().copied()).collect()
    }

    /// Get UVs as a flat array.
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.iter().copied()).collect()
    }

    /// Get bone indices as a flat array.
    pub fn joints_flat(&self) -> Vec<u16> {
        self.joints.iter().flat_map(|j| j.iter().copied()).collect()
    }

    /// Get bone weights as a flat array.
    pub fn weights_flat(&self) -> Vec<f32> {
        self.weights.iter().flat_map(|w| w.iter().copied()).collect()
    }

    /// Face groups as `[start, count]` pairs in [`PageFace::ALL`](crate::geometry::PageFace::ALL) order.
    pub fn groups_flat(&self) -> Vec<u32> {
        self.groups
            .iter()
            .flat_map(|g| [g.start as u32, g.count as u32])
            .collect()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
