//! Skinned page geometry.
//!
//! [`PageGeometry`] builds the segmented page box that every page shares, and
//! [`skeleton`] turns a page's bone angles into the matrices that deform it.

pub mod page;
pub mod skeleton;

pub use page::{FaceGroup, PageFace, PageGeometry};

/// A vertex of a skinned mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in bind pose.
    pub position: [f32; 3],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Indices of the bones influencing this vertex.
    pub joints: [u16; 4],
    /// Weights matching `joints`, summing to one.
    pub weights: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0], // Rigidly bound to the root by default
        }
    }

    pub fn with_skin(mut self, joints: [u16; 4], weights: [f32; 4]) -> Self {
        self.joints = joints;
        self.weights = weights;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0])
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Translate all vertices by an offset.
    pub fn translate(&mut self, offset: [f32; 3]) {
        for vertex in &mut self.vertices {
            vertex.position[0] += offset[0];
            vertex.position[1] += offset[1];
            vertex.position[2] += offset[2];
        }
    }

    /// Get positions as a flat array (for glTF export).
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Get normals as a flat array (for glTF export).
    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    /// Get UVs as a flat array (for glTF export).
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }

    /// Get joint indices as a flat array (for glTF export).
    pub fn joints_flat(&self) -> Vec<u16> {
        self.vertices.iter().flat_map(|v| v.joints).collect()
    }

    /// Get skin weights as a flat array (for glTF export).
    pub fn weights_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.weights).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let mut mesh = Mesh::new();
        assert!(mesh.is_empty());

        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]));

        mesh.add_triangle(v0, v1, v2);

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_flat_skin_arrays() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::default().with_skin([3, 4, 0, 0], [0.25, 0.75, 0.0, 0.0]));
        assert_eq!(mesh.joints_flat(), vec![3, 4, 0, 0]);
        assert_eq!(mesh.weights_flat(), vec![0.25, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn test_translate() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0], [0.0, 0.0]));
        mesh.translate([0.5, 0.0, -1.0]);
        assert_eq!(mesh.vertices[0].position, [1.5, 2.0, 2.0]);
    }
}
