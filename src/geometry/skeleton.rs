//! Bone chain composition and CPU skinning.
//!
//! Pages store only local angles. These functions turn them into world
//! matrices by walking the chain from the spine outwards: bone 0 sits on the
//! hinge and every following bone is offset one segment width along its
//! parent's +x.

use super::Mesh;
use crate::config::PageDimensions;
use crate::types::BoneAngle;
use glam::{Mat4, Vec3};

/// Local offset of a bone from its parent in bind pose.
pub fn bone_offset(index: usize, dimensions: &PageDimensions) -> Vec3 {
    if index == 0 {
        Vec3::ZERO
    } else {
        Vec3::new(dimensions.segment_width(), 0.0, 0.0)
    }
}

/// World matrices of every bone for the given local angles.
pub fn compose(angles: &[BoneAngle], dimensions: &PageDimensions) -> Vec<Mat4> {
    let mut world = Vec::with_capacity(angles.len());
    let mut parent = Mat4::IDENTITY;
    for (i, angle) in angles.iter().enumerate() {
        let local = Mat4::from_rotation_translation(angle.to_quat(), bone_offset(i, dimensions));
        parent *= local;
        world.push(parent);
    }
    world
}

/// Inverse bind matrices of the chain (the unbent page).
pub fn inverse_bind_matrices(dimensions: &PageDimensions) -> Vec<Mat4> {
    let sw = dimensions.segment_width();
    (0..dimensions.bone_count())
        .map(|i| Mat4::from_translation(Vec3::new(-(i as f32) * sw, 0.0, 0.0)))
        .collect()
}

/// Matrices that move bind-pose vertices into the posed chain.
pub fn skinning_matrices(angles: &[BoneAngle], dimensions: &PageDimensions) -> Vec<Mat4> {
    compose(angles, dimensions)
        .into_iter()
        .zip(inverse_bind_matrices(dimensions))
        .map(|(world, inverse_bind)| world * inverse_bind)
        .collect()
}

/// Deform a mesh on the CPU. Joints without a matrix are treated as identity.
pub fn skin_mesh(mesh: &Mesh, skinning: &[Mat4]) -> Mesh {
    let mut out = mesh.clone();
    for vertex in &mut out.vertices {
        let position = Vec3::from(vertex.position);
        let normal = Vec3::from(vertex.normal);
        let mut skinned_position = Vec3::ZERO;
        let mut skinned_normal = Vec3::ZERO;

        for (&joint, &weight) in vertex.joints.iter().zip(vertex.weights.iter()) {
            if weight == 0.0 {
                continue;
            }
            let m = skinning.get(joint as usize).copied().unwrap_or(Mat4::IDENTITY);
            skinned_position += m.transform_point3(position) * weight;
            skinned_normal += m.transform_vector3(normal) * weight;
        }

        vertex.position = skinned_position.to_array();
        vertex.normal = skinned_normal.normalize_or_zero().to_array();
    }
    out
}

/// Corners of each segment strip in world space, for picking.
///
/// Segment `i` is the part of the page rigidly carried by bone `i`, spanning
/// one segment width along the bone's +x and the full page height.
pub fn segment_quads(world: &[Mat4], dimensions: &PageDimensions) -> Vec<[Vec3; 4]> {
    let sw = dimensions.segment_width();
    let half_h = dimensions.height / 2.0;
    world
        .iter()
        .take(dimensions.segments)
        .map(|m| {
            [
                m.transform_point3(Vec3::new(0.0, -half_h, 0.0)),
                m.transform_point3(Vec3::new(sw, -half_h, 0.0)),
                m.transform_point3(Vec3::new(sw, half_h, 0.0)),
                m.transform_point3(Vec3::new(0.0, half_h, 0.0)),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageGeometry;
    use std::f32::consts::FRAC_PI_2;

    fn dims() -> PageDimensions {
        PageDimensions {
            width: 1.0,
            height: 2.0,
            depth: 0.01,
            segments: 4,
        }
    }

    #[test]
    fn test_straight_chain_matches_bind_pose() {
        let d = dims();
        let world = compose(&vec![BoneAngle::ZERO; d.bone_count()], &d);
        assert_eq!(world.len(), 5);
        for (i, m) in world.iter().enumerate() {
            let p = m.transform_point3(Vec3::ZERO);
            assert!(p.abs_diff_eq(Vec3::new(i as f32 * 0.25, 0.0, 0.0), 1e-6));
        }
        for m in skinning_matrices(&vec![BoneAngle::ZERO; d.bone_count()], &d) {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_hinge_rotation_swings_whole_page() {
        let d = dims();
        let mut angles = vec![BoneAngle::ZERO; d.bone_count()];
        angles[0].y = FRAC_PI_2;
        let world = compose(&angles, &d);
        // The last bone sits on the outer edge
        let tip = world[4].transform_point3(Vec3::ZERO);
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_skinned_page_follows_hinge() {
        let d = dims();
        let geo = PageGeometry::build(&d);
        let mut angles = vec![BoneAngle::ZERO; d.bone_count()];
        angles[0].y = FRAC_PI_2;
        let skinned = skin_mesh(&geo.mesh, &skinning_matrices(&angles, &d));
        for (before, after) in geo.mesh.vertices.iter().zip(&skinned.vertices) {
            // Ry(90°) maps x to -z and z to x
            assert!((after.position[2] + before.position[0]).abs() < 1e-4);
            assert!((after.position[0] - before.position[2]).abs() < 1e-4);
            assert!((after.position[1] - before.position[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_segment_quads_cover_page() {
        let d = dims();
        let world = compose(&vec![BoneAngle::ZERO; d.bone_count()], &d);
        let quads = segment_quads(&world, &d);
        assert_eq!(quads.len(), 4);
        assert!(quads[3][2].abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
        assert!(quads[0][0].abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-6));
    }
}
