//! Pointer picking.
//!
//! The session only needs a [`PagePicker`]: something that maps a pointer
//! position to at most one page. [`RayPicker`] is the stock implementation; it
//! casts a camera ray against the posed segment strips of every page.

use crate::geometry::skeleton;
use crate::session::BookSession;
use glam::{Mat4, Vec2, Vec3};

/// Hover change reported by [`BookSession::pointer_moved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    Enter(usize),
    Leave(usize),
}

/// Where hover hits come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSource {
    /// The session picks with its own picker. `None` means the pointer is
    /// outside the viewport.
    BuiltIn(Option<Vec2>),
    /// The host picks and reports hits through
    /// [`BookSession::pointer_moved`]; frames leave hover alone.
    Host,
}

impl Default for PointerSource {
    fn default() -> Self {
        PointerSource::BuiltIn(None)
    }
}

/// Resolves the page under a pointer.
pub trait PagePicker {
    /// `pointer` is in normalized viewport coordinates: (0, 0) top-left,
    /// (1, 1) bottom-right.
    fn pick(&self, session: &BookSession, pointer: Vec2) -> Option<usize>;
}

impl<F> PagePicker for F
where
    F: Fn(&BookSession, Vec2) -> Option<usize>,
{
    fn pick(&self, session: &BookSession, pointer: Vec2) -> Option<usize> {
        self(session, pointer)
    }
}

/// Picker for hosts without picking support; navigation stays button-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPicker;

impl PagePicker for NoPicker {
    fn pick(&self, _session: &BookSession, _pointer: Vec2) -> Option<usize> {
        None
    }
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Distance along the ray to a triangle, either side facing.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        const EPSILON: f32 = 1e-7;
        let edge1 = b - a;
        let edge2 = c - a;
        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < EPSILON {
            return None; // Parallel
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = inv_det * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = inv_det * edge2.dot(q);
        (t > EPSILON).then_some(t)
    }

    /// Distance to a planar quad given in winding order.
    pub fn intersect_quad(&self, quad: &[Vec3; 4]) -> Option<f32> {
        let first = self.intersect_triangle(quad[0], quad[1], quad[2]);
        let second = self.intersect_triangle(quad[0], quad[2], quad[3]);
        match (first, second) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Perspective camera looking at a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width over height.
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(-0.5, 1.0, 4.0),
            target: Vec3::ZERO,
            fov_y: 45f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Ray through a pointer in normalized viewport coordinates.
    pub fn ray(&self, pointer: Vec2) -> Ray {
        let ndc_x = (pointer.x - 0.5) * 2.0;
        let ndc_y = -(pointer.y - 0.5) * 2.0;

        let tan_half_fov = (self.fov_y / 2.0).tan();
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward).normalize();

        let direction = (forward
            + right * (ndc_x * tan_half_fov * self.aspect)
            + up * (ndc_y * tan_half_fov))
            .normalize();
        Ray {
            origin: self.position,
            direction,
        }
    }
}

/// Casts camera rays against the posed pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayPicker {
    pub camera: Camera,
    /// Placement of the whole book in the scene.
    pub book_transform: Mat4,
}

impl RayPicker {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            book_transform: Mat4::IDENTITY,
        }
    }

    pub fn with_book_transform(mut self, transform: Mat4) -> Self {
        self.book_transform = transform;
        self
    }

    /// Nearest page hit by a world ray, with its distance.
    pub fn cast(&self, session: &BookSession, ray: &Ray) -> Option<(usize, f32)> {
        let dimensions = &session.config().dimensions;
        let mut best: Option<(usize, f32)> = None;

        for page in session.pages() {
            let Some(bones) = session.bone_matrices(page.index()) else {
                continue;
            };
            let world: Vec<Mat4> = bones.into_iter().map(|m| self.book_transform * m).collect();

            for quad in skeleton::segment_quads(&world, dimensions) {
                if let Some(t) = ray.intersect_quad(&quad) {
                    if best.map_or(true, |(_, d)| t < d) {
                        best = Some((page.index(), t));
                    }
                }
            }
        }
        best
    }
}

impl PagePicker for RayPicker {
    fn pick(&self, session: &BookSession, pointer: Vec2) -> Option<usize> {
        let ray = self.camera.ray(pointer);
        self.cast(session, &ray).map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BookConfig;
    use crate::types::{BookContent, PageContent};

    fn session(pages: usize) -> BookSession {
        let book = BookContent::new(vec![PageContent::default(); pages]).unwrap();
        BookSession::new(book, BookConfig::default()).unwrap()
    }

    fn front_camera() -> Camera {
        Camera {
            position: Vec3::new(0.65, 0.1, 3.0),
            target: Vec3::new(0.65, 0.1, 0.0),
            fov_y: 45f32.to_radians(),
            aspect: 1.0,
        }
    }

    #[test]
    fn test_ray_triangle() {
        let ray = Ray {
            origin: Vec3::new(0.2, 0.2, 1.0),
            direction: Vec3::NEG_Z,
        };
        let t = ray.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert!((t - 1.0).abs() < 1e-6);

        let miss = Ray {
            origin: Vec3::new(0.9, 0.9, 1.0),
            direction: Vec3::NEG_Z,
        };
        assert!(miss.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y).is_none());

        // Behind the origin
        let away = Ray {
            origin: Vec3::new(0.2, 0.2, 1.0),
            direction: Vec3::Z,
        };
        assert!(away.intersect_triangle(Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_camera_center_ray_points_at_target() {
        let camera = front_camera();
        let ray = camera.ray(Vec2::new(0.5, 0.5));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        // Top of the viewport tilts up
        assert!(camera.ray(Vec2::new(0.5, 0.0)).direction.y > 0.0);
    }

    #[test]
    fn test_picks_front_page() {
        let mut s = session(4);
        s.frame(0.0, 0.0);
        let picker = RayPicker::new(front_camera());
        assert_eq!(picker.pick(&s, Vec2::new(0.5, 0.5)), Some(0));

        let (_, distance) = picker.cast(&s, &front_camera().ray(Vec2::new(0.5, 0.5))).unwrap();
        assert!((distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_beside_book_misses() {
        let s = session(4);
        let picker = RayPicker::new(front_camera());
        assert_eq!(picker.pick(&s, Vec2::new(0.0, 0.5)), None);
    }

    #[test]
    fn test_book_transform_moves_pages() {
        let s = session(4);
        let picker = RayPicker::new(front_camera())
            .with_book_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(picker.pick(&s, Vec2::new(0.5, 0.5)), None);
    }

    #[test]
    fn test_no_picker_degrades_to_buttons() {
        let mut s = session(4);
        let events = s.tick(0.0, 0.016, Some(Vec2::new(0.5, 0.5)), &NoPicker);
        assert!(events.is_empty());
        assert_eq!(s.click(0.0), None);
    }
}
