//! The shared page mesh.
//!
//! A page is a thin box hinged at x = 0 and extending to +x. It is split into
//! `segments` strips along its width; each strip is bound to two neighbouring
//! bones so the chain can bend it smoothly.

use super::{Mesh, Vertex};
use crate::config::PageDimensions;
use crate::types::{BoundingBox, PageSide};

/// One side of the page box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageFace {
    /// Outer edge (+x).
    OuterEdge,
    /// Spine edge (-x).
    SpineEdge,
    /// Top edge (+y).
    TopEdge,
    /// Bottom edge (-y).
    BottomEdge,
    /// Printed front (+z).
    Front,
    /// Printed back (-z).
    Back,
}

impl PageFace {
    /// All faces in mesh order.
    pub const ALL: [PageFace; 6] = [
        PageFace::OuterEdge,
        PageFace::SpineEdge,
        PageFace::TopEdge,
        PageFace::BottomEdge,
        PageFace::Front,
        PageFace::Back,
    ];

    /// The printed side shown on this face, if any. Edges are plain paper.
    pub fn side(&self) -> Option<PageSide> {
        match self {
            PageFace::Front => Some(PageSide::Front),
            PageFace::Back => Some(PageSide::Back),
            _ => None,
        }
    }
}

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    pub face: PageFace,
    /// First index in `Mesh::indices`.
    pub start: usize,
    /// Number of indices.
    pub count: usize,
}

/// Segmented, skin-weighted page mesh plus its per-face index groups.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub mesh: Mesh,
    pub groups: Vec<FaceGroup>,
    pub dimensions: PageDimensions,
}

impl PageGeometry {
    /// Build the page mesh for the given dimensions.
    pub fn build(dimensions: &PageDimensions) -> Self {
        let d = *dimensions;
        let mut mesh = Mesh::new();
        let mut groups = Vec::with_capacity(6);

        let (w, h, t) = (d.width, d.height, d.depth);
        let (ws, hs, ds) = (d.segments, 2, 1);

        // (u, v, w axes, u dir, v dir, plane width, plane height, signed depth, grid)
        let planes = [
            (PageFace::OuterEdge, Plane { u: 2, v: 1, w: 0, udir: -1.0, vdir: -1.0, width: t, height: h, depth: w, grid_x: ds, grid_y: hs }),
            (PageFace::SpineEdge, Plane { u: 2, v: 1, w: 0, udir: 1.0, vdir: -1.0, width: t, height: h, depth: -w, grid_x: ds, grid_y: hs }),
            (PageFace::TopEdge, Plane { u: 0, v: 2, w: 1, udir: 1.0, vdir: 1.0, width: w, height: t, depth: h, grid_x: ws, grid_y: ds }),
            (PageFace::BottomEdge, Plane { u: 0, v: 2, w: 1, udir: 1.0, vdir: -1.0, width: w, height: t, depth: -h, grid_x: ws, grid_y: ds }),
            (PageFace::Front, Plane { u: 0, v: 1, w: 2, udir: 1.0, vdir: -1.0, width: w, height: h, depth: t, grid_x: ws, grid_y: hs }),
            (PageFace::Back, Plane { u: 0, v: 1, w: 2, udir: -1.0, vdir: -1.0, width: w, height: h, depth: -t, grid_x: ws, grid_y: hs }),
        ];

        for (face, plane) in planes {
            let start = mesh.indices.len();
            plane.emit(&mut mesh);
            groups.push(FaceGroup {
                face,
                start,
                count: mesh.indices.len() - start,
            });
        }

        // Hinge at the spine
        mesh.translate([w / 2.0, 0.0, 0.0]);

        let segment_width = d.segment_width();
        let last_bone = d.segments as u16;
        for vertex in &mut mesh.vertices {
            let (joints, weights) = skin_for_x(vertex.position[0], segment_width, last_bone);
            vertex.joints = joints;
            vertex.weights = weights;
        }

        Self {
            mesh,
            groups,
            dimensions: d,
        }
    }

    /// Index range of one face.
    pub fn group(&self, face: PageFace) -> Option<&FaceGroup> {
        self.groups.iter().find(|g| g.face == face)
    }

    /// Bounds of the unbent page.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.mesh.vertices.iter().map(|v| v.position))
            .unwrap_or_else(|| BoundingBox::new([0.0; 3], [0.0; 3]))
    }
}

/// Skin binding of a vertex at distance `x` from the spine.
///
/// The vertex blends linearly between the bone that starts its segment and the
/// next one. Both indices are clamped to the chain so the outer edge stays
/// bound to the last bone.
fn skin_for_x(x: f32, segment_width: f32, last_bone: u16) -> ([u16; 4], [f32; 4]) {
    let index = ((x / segment_width).floor().max(0.0) as u16).min(last_bone);
    let weight = if index == last_bone {
        0.0
    } else {
        (x % segment_width) / segment_width
    };
    let next = (index + 1).min(last_bone);
    (
        [index, next, 0, 0],
        [1.0 - weight, weight, 0.0, 0.0],
    )
}

/// One subdivided side of a box, centered on the origin.
struct Plane {
    u: usize,
    v: usize,
    w: usize,
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: usize,
    grid_y: usize,
}

impl Plane {
    fn emit(&self, mesh: &mut Mesh) {
        let segment_w = self.width / self.grid_x as f32;
        let segment_h = self.height / self.grid_y as f32;
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let half_d = self.depth / 2.0;
        let cols = self.grid_x + 1;
        let base = mesh.vertices.len() as u32;

        for iy in 0..=self.grid_y {
            let y = iy as f32 * segment_h - half_h;
            for ix in 0..=self.grid_x {
                let x = ix as f32 * segment_w - half_w;

                let mut position = [0.0; 3];
                position[self.u] = x * self.udir;
                position[self.v] = y * self.vdir;
                position[self.w] = half_d;

                let mut normal = [0.0; 3];
                normal[self.w] = if self.depth > 0.0 { 1.0 } else { -1.0 };

                let uv = [
                    ix as f32 / self.grid_x as f32,
                    1.0 - iy as f32 / self.grid_y as f32,
                ];
                mesh.add_vertex(Vertex::new(position, normal, uv));
            }
        }

        for iy in 0..self.grid_y {
            for ix in 0..self.grid_x {
                let a = base + (ix + cols * iy) as u32;
                let b = base + (ix + cols * (iy + 1)) as u32;
                let c = base + (ix + 1 + cols * (iy + 1)) as u32;
                let d = base + (ix + 1 + cols * iy) as u32;
                mesh.add_triangle(a, b, d);
                mesh.add_triangle(b, c, d);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_geometry() -> PageGeometry {
        PageGeometry::build(&PageDimensions::default())
    }

    #[test]
    fn test_vertex_and_triangle_counts() {
        let geo = default_geometry();
        // Edges: 6 + 6 + 62 + 62, printed faces: 93 + 93
        assert_eq!(geo.mesh.vertex_count(), 322);
        assert_eq!(geo.mesh.triangle_count(), 368);
        assert_eq!(geo.groups.len(), 6);
        let total: usize = geo.groups.iter().map(|g| g.count).sum();
        assert_eq!(total, geo.mesh.indices.len());
    }

    #[test]
    fn test_hinged_at_spine() {
        let geo = default_geometry();
        let bounds = geo.bounds();
        assert!(bounds.min[0].abs() < 1e-6);
        assert!((bounds.max[0] - 1.28).abs() < 1e-5);
        assert!((bounds.min[1] + 1.71 / 2.0).abs() < 1e-5);
        assert!((bounds.max[2] - 0.0015).abs() < 1e-6);
    }

    #[test]
    fn test_front_faces_positive_z() {
        let geo = default_geometry();
        let group = geo.group(PageFace::Front).unwrap();
        for &i in &geo.mesh.indices[group.start..group.start + group.count] {
            assert_eq!(geo.mesh.vertices[i as usize].normal, [0.0, 0.0, 1.0]);
        }
        let back = geo.group(PageFace::Back).unwrap();
        let i = geo.mesh.indices[back.start] as usize;
        assert_eq!(geo.mesh.vertices[i].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_skin_weights_are_normalized_and_in_range() {
        let geo = default_geometry();
        for v in &geo.mesh.vertices {
            let sum: f32 = v.weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!(v.joints[0] <= 30 && v.joints[1] <= 30);
            assert!(v.joints[1] == v.joints[0] || v.joints[1] == v.joints[0] + 1);
        }
    }

    #[test]
    fn test_skin_for_x() {
        let sw = 0.1;
        assert_eq!(skin_for_x(0.0, sw, 10), ([0, 1, 0, 0], [1.0, 0.0, 0.0, 0.0]));

        let (joints, weights) = skin_for_x(0.25, sw, 10);
        assert_eq!(joints, [2, 3, 0, 0]);
        assert!((weights[1] - 0.5).abs() < 1e-4);

        // The outer edge stays on the last bone
        let (joints, weights) = skin_for_x(1.0, sw, 10);
        assert_eq!(joints[0], 10);
        assert_eq!(joints[1], 10);
        assert_eq!(weights[0] + weights[1], 1.0);
    }
}
