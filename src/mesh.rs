//! CPU-side triangle geometry for the primitive shapes the demos are built from.
//!
//! All shapes wind counter-clockwise when seen from outside, so
//! `face_normal` points away from the surface.

use std::f32::consts::TAU;

use glam::{Mat3, Mat4, Vec2, Vec3};

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<[u32; 3]>,
}

impl Geometry {
    /// Cone with its apex on +Y, base centred at `-height / 2`.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half = height / 2.0;
        let mut geo = Geometry::default();

        let apex = geo.push(Vec3::new(0.0, half, 0.0), Vec2::new(0.5, 1.0));
        let centre = geo.push(Vec3::new(0.0, -half, 0.0), Vec2::new(0.5, 0.0));

        let ring: Vec<u32> = (0..=segments)
            .map(|i| {
                let u = i as f32 / segments as f32;
                let theta = u * TAU;
                geo.push(
                    Vec3::new(radius * theta.sin(), -half, radius * theta.cos()),
                    Vec2::new(u, 0.0),
                )
            })
            .collect();

        for pair in ring.windows(2) {
            geo.triangles.push([pair[0], pair[1], apex]);
            geo.triangles.push([centre, pair[1], pair[0]]);
        }
        geo
    }

    /// Axis-aligned box centred at the origin. Each face maps the full 0..1 UV square.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) / 2.0;
        // (normal, u axis, v axis) with u x v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut geo = Geometry::default();
        for (normal, u_axis, v_axis) in faces {
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            let base = geo.positions.len() as u32;
            for (su, sv) in corners {
                let p = (normal + u_axis * su + v_axis * sv) * half;
                geo.push(p, Vec2::new((su + 1.0) / 2.0, (sv + 1.0) / 2.0));
            }
            geo.triangles.push([base, base + 1, base + 2]);
            geo.triangles.push([base, base + 2, base + 3]);
        }
        geo
    }

    /// Flat plane on y = 0 facing +Y, `segments` cells per side.
    pub fn plane(width: f32, depth: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let mut geo = Geometry::default();
        for j in 0..=segments {
            for i in 0..=segments {
                let u = i as f32 / segments as f32;
                let v = j as f32 / segments as f32;
                geo.push(
                    Vec3::new(-width / 2.0 + u * width, 0.0, -depth / 2.0 + v * depth),
                    Vec2::new(u, v),
                );
            }
        }
        geo.triangles = grid_triangles(segments as usize);
        geo
    }

    fn push(&mut self, position: Vec3, uv: Vec2) -> u32 {
        self.positions.push(position);
        self.uvs.push(uv);
        (self.positions.len() - 1) as u32
    }

    pub fn translate(mut self, offset: Vec3) -> Self {
        for p in &mut self.positions {
            *p += offset;
        }
        self
    }

    pub fn rotate_x(self, angle: f32) -> Self {
        self.apply_mat3(Mat3::from_rotation_x(angle))
    }

    pub fn rotate_y(self, angle: f32) -> Self {
        self.apply_mat3(Mat3::from_rotation_y(angle))
    }

    fn apply_mat3(mut self, m: Mat3) -> Self {
        for p in &mut self.positions {
            *p = m * *p;
        }
        self
    }

    /// Copy of the geometry with every position transformed by `m`.
    pub fn transformed(&self, m: &Mat4) -> Geometry {
        Geometry {
            positions: self.positions.iter().map(|&p| m.transform_point3(p)).collect(),
            uvs: self.uvs.clone(),
            triangles: self.triangles.clone(),
        }
    }

    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[i];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    pub fn triangle_uvs(&self, i: usize) -> [Vec2; 3] {
        let [a, b, c] = self.triangles[i];
        [self.uvs[a as usize], self.uvs[b as usize], self.uvs[c as usize]]
    }

    /// Unit normal of triangle `i`, or zero for a degenerate triangle.
    pub fn face_normal(&self, i: usize) -> Vec3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(c - a).normalize_or_zero()
    }
}

/// Triangle indices for a `(segments + 1)²` vertex grid laid out row-major
/// with x varying fastest. Normals face +Y when z grows down the rows.
pub fn grid_triangles(segments: usize) -> Vec<[u32; 3]> {
    let row = segments + 1;
    let mut triangles = Vec::with_capacity(segments * segments * 2);
    for j in 0..segments {
        for i in 0..segments {
            let a = (j * row + i) as u32;
            let b = ((j + 1) * row + i) as u32;
            let c = ((j + 1) * row + i + 1) as u32;
            let d = (j * row + i + 1) as u32;
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward(geo: &Geometry) -> bool {
        let centroid = geo.positions.iter().copied().sum::<Vec3>() / geo.positions.len() as f32;
        (0..geo.triangles.len()).all(|i| {
            let [a, b, c] = geo.triangle(i);
            let face_centre = (a + b + c) / 3.0;
            geo.face_normal(i).dot(face_centre - centroid) > 0.0
        })
    }

    #[test]
    fn test_cuboid_normals_point_outward() {
        let geo = Geometry::cuboid(4.0, 4.0, 4.0);
        assert_eq!(geo.triangles.len(), 12);
        assert!(outward(&geo));
    }

    #[test]
    fn test_cone_normals_point_outward() {
        let geo = Geometry::cone(2.0, 8.0, 6);
        assert_eq!(geo.triangles.len(), 12);
        assert!(outward(&geo));
    }

    #[test]
    fn test_plane_faces_up() {
        let geo = Geometry::plane(10.0, 10.0, 4);
        assert_eq!(geo.positions.len(), 25);
        assert_eq!(geo.triangles.len(), 32);
        for i in 0..geo.triangles.len() {
            assert!(geo.face_normal(i).y > 0.99);
        }
    }

    #[test]
    fn test_translate_moves_base_to_origin() {
        let geo = Geometry::cone(2.0, 8.0, 6).translate(Vec3::new(0.0, 4.0, 0.0));
        let min_y = geo.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!(min_y.abs() < 1e-5);
    }

    #[test]
    fn test_rotate_x_lays_cone_flat() {
        let geo = Geometry::cone(0.5, 2.0, 4).rotate_x(std::f32::consts::FRAC_PI_2);
        let apex = geo.positions[0];
        assert!((apex.z - 1.0).abs() < 1e-5);
        assert!(apex.y.abs() < 1e-5);
    }
}
