//! Software rasterizer: a color + depth framebuffer and the projection glue
//! that turns world-space triangles, lines and points into pixels.
//!
//! There is no backface culling; the depth buffer sorts opaque surfaces.
//! Translucent primitives depth-test but do not write depth, so draw them
//! after everything opaque.

use glam::{Mat4, Vec2, Vec3, Vec4};
use image::{ImageBuffer, Rgb as Pixel, RgbImage};

use crate::color::Rgb;
use crate::texture::Texture;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenVertex {
    x: f32,
    y: f32,
    /// NDC depth, 0 at the near plane and 1 at the far plane.
    z: f32,
    uv: Vec2,
}

/// A vertex during clipping: view-space position plus texture coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ClipVertex {
    pos: Vec3,
    uv: Vec2,
}

/// How a triangle's pixels get their color.
#[derive(Clone, Copy, Debug)]
pub enum Fill<'a> {
    /// Single color, depth written.
    Solid(Rgb),
    /// Texture modulated by `light`, then blended toward `fog` by `fog_factor`.
    Textured {
        texture: &'a Texture,
        light: Rgb,
        fog: Rgb,
        fog_factor: f32,
    },
    /// Alpha-blended over what is already there, depth tested but not written.
    Blend { color: Rgb, alpha: f32 },
}

/// Camera matrices plus viewport, precomputed once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    view: Mat4,
    projection: Mat4,
    near: f32,
    width: f32,
    height: f32,
}

impl Projector {
    pub fn new(view: Mat4, projection: Mat4, near: f32, width: usize, height: usize) -> Self {
        Self {
            view,
            projection,
            near,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn to_view(&self, world: Vec3) -> Vec3 {
        self.view.transform_point3(world)
    }

    /// Distance from the eye, used for fog.
    pub fn view_distance(&self, world: Vec3) -> f32 {
        self.to_view(world).length()
    }

    fn to_screen(&self, v: ClipVertex) -> ScreenVertex {
        let clip = self.projection * Vec4::new(v.pos.x, v.pos.y, v.pos.z, 1.0);
        let inv_w = 1.0 / clip.w;
        let ndc = Vec3::new(clip.x * inv_w, clip.y * inv_w, clip.z * inv_w);
        ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * self.width,
            y: (1.0 - ndc.y) * 0.5 * self.height,
            z: ndc.z,
            uv: v.uv,
        }
    }

    /// Screen position of a world point if it is in front of the near plane.
    pub fn project_point(&self, world: Vec3) -> Option<(f32, f32, f32)> {
        let v = self.to_view(world);
        if -v.z < self.near {
            return None;
        }
        let s = self.to_screen(ClipVertex { pos: v, uv: Vec2::ZERO });
        Some((s.x, s.y, s.z))
    }

    /// Screen-space size in pixels of a world length at view depth `depth`.
    fn pixel_size(&self, length: f32, depth: f32) -> f32 {
        // projection[1][1] is cot(fov / 2)
        length * self.projection.y_axis.y * self.height * 0.5 / depth.max(self.near)
    }
}

/// Sutherland-Hodgman against the near plane (`z <= -near` is kept).
fn clip_near(poly: &[ClipVertex], near: f32) -> Vec<ClipVertex> {
    let inside = |v: &ClipVertex| -v.pos.z >= near;
    let mut out = Vec::with_capacity(poly.len() + 1);
    for i in 0..poly.len() {
        let cur = poly[i];
        let next = poly[(i + 1) % poly.len()];
        let (cur_in, next_in) = (inside(&cur), inside(&next));
        if cur_in {
            out.push(cur);
        }
        if cur_in != next_in {
            let t = (-near - cur.pos.z) / (next.pos.z - cur.pos.z);
            out.push(ClipVertex {
                pos: cur.pos + (next.pos - cur.pos) * t,
                uv: cur.uv + (next.uv - cur.uv) * t,
            });
        }
    }
    out
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    color: Vec<u32>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color: vec![0; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn clear(&mut self, background: Rgb) {
        self.color.fill(background.to_u32());
        self.depth.fill(f32::INFINITY);
    }

    /// Packed 0x00RRGGBB pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.color
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        Rgb::from_u32(self.color[y * self.width + x])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    pub fn to_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            Pixel(self.pixel(x as usize, y as usize).to_rgb8())
        })
    }

    /// Draw a world-space triangle. `uvs` is only read by `Fill::Textured`.
    pub fn draw_triangle(&mut self, projector: &Projector, world: [Vec3; 3], uvs: [Vec2; 3], fill: Fill<'_>) {
        let poly: Vec<ClipVertex> = world
            .iter()
            .zip(uvs)
            .map(|(&p, uv)| ClipVertex { pos: projector.to_view(p), uv })
            .collect();
        let clipped = clip_near(&poly, projector.near);
        if clipped.len() < 3 {
            return;
        }
        let screen: Vec<ScreenVertex> = clipped.into_iter().map(|v| projector.to_screen(v)).collect();
        for i in 1..screen.len() - 1 {
            self.raster_triangle(&screen[0], &screen[i], &screen[i + 1], fill);
        }
    }

    /// Solid-color shorthand for `draw_triangle`.
    pub fn fill_triangle(&mut self, projector: &Projector, world: [Vec3; 3], color: Rgb) {
        self.draw_triangle(projector, world, [Vec2::ZERO; 3], Fill::Solid(color));
    }

    fn raster_triangle(&mut self, a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex, fill: Fill<'_>) {
        let area = edge(a, b, c.x, c.y);
        if area.abs() < 1e-6 {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32 - 1.0);
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        let inv_area = 1.0 / area;
        for y in min_y..=max_y {
            let py = y as f32 + 0.5;
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let l0 = edge(b, c, px, py) * inv_area;
                let l1 = edge(c, a, px, py) * inv_area;
                let l2 = edge(a, b, px, py) * inv_area;
                if l0 < 0.0 || l1 < 0.0 || l2 < 0.0 {
                    continue;
                }

                let z = l0 * a.z + l1 * b.z + l2 * c.z;
                let idx = y * self.width + x;
                if z >= self.depth[idx] || !(0.0..=1.0).contains(&z) {
                    continue;
                }

                match fill {
                    Fill::Solid(color) => {
                        self.color[idx] = color.to_u32();
                        self.depth[idx] = z;
                    }
                    Fill::Textured { texture, light, fog, fog_factor } => {
                        let uv = a.uv * l0 + b.uv * l1 + c.uv * l2;
                        let lit = texture.sample(uv.x, uv.y).mul(light).clamped();
                        self.color[idx] = lit.lerp(fog, fog_factor).to_u32();
                        self.depth[idx] = z;
                    }
                    Fill::Blend { color, alpha } => {
                        let under = Rgb::from_u32(self.color[idx]);
                        self.color[idx] = under.lerp(color, alpha).to_u32();
                    }
                }
            }
        }
    }

    /// Depth-tested line between two world points.
    pub fn draw_line(&mut self, projector: &Projector, from: Vec3, to: Vec3, color: Rgb) {
        let mut a = ClipVertex { pos: projector.to_view(from), uv: Vec2::ZERO };
        let mut b = ClipVertex { pos: projector.to_view(to), uv: Vec2::ZERO };
        let near = projector.near;
        let (a_in, b_in) = (-a.pos.z >= near, -b.pos.z >= near);
        if !a_in && !b_in {
            return;
        }
        if a_in != b_in {
            let t = (-near - a.pos.z) / (b.pos.z - a.pos.z);
            let cut = ClipVertex { pos: a.pos + (b.pos - a.pos) * t, uv: Vec2::ZERO };
            if a_in {
                b = cut;
            } else {
                a = cut;
            }
        }

        let sa = projector.to_screen(a);
        let sb = projector.to_screen(b);
        let steps = (sb.x - sa.x).abs().max((sb.y - sa.y).abs()).ceil().min(8192.0) as usize;
        let packed = color.to_u32();
        for i in 0..=steps {
            let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
            let x = sa.x + (sb.x - sa.x) * t;
            let y = sa.y + (sb.y - sa.y) * t;
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }
            let z = sa.z + (sb.z - sa.z) * t;
            let idx = y as usize * self.width + x as usize;
            if z < self.depth[idx] && (0.0..=1.0).contains(&z) {
                self.color[idx] = packed;
                self.depth[idx] = z;
            }
        }
    }

    /// Alpha-blended square sprite of world size `size` centred on `world`.
    pub fn blend_point(&mut self, projector: &Projector, world: Vec3, size: f32, color: Rgb, alpha: f32) {
        let view = projector.to_view(world);
        let depth = -view.z;
        if depth < projector.near {
            return;
        }
        let s = projector.to_screen(ClipVertex { pos: view, uv: Vec2::ZERO });
        let half = (projector.pixel_size(size, depth) * 0.5).max(0.5);

        let min_x = (s.x - half).floor().max(0.0) as usize;
        let min_y = (s.y - half).floor().max(0.0) as usize;
        let max_x = ((s.x + half).ceil() as isize).min(self.width as isize - 1);
        let max_y = ((s.y + half).ceil() as isize).min(self.height as isize - 1);
        if max_x < 0 || max_y < 0 {
            return;
        }
        for y in min_y..=max_y as usize {
            for x in min_x..=max_x as usize {
                let idx = y * self.width + x;
                if s.z < self.depth[idx] {
                    let under = Rgb::from_u32(self.color[idx]);
                    self.color[idx] = under.lerp(color, alpha).to_u32();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera::Camera;

    fn projector(width: usize, height: usize) -> Projector {
        let mut camera = Camera::new(60.0, width as f32 / height as f32, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.target = Vec3::ZERO;
        Projector::new(camera.view(), camera.projection(), camera.near, width, height)
    }

    fn quad(fb: &mut Framebuffer, p: &Projector, z: f32, size: f32, color: Rgb) {
        let (a, b, c, d) = (
            Vec3::new(-size, -size, z),
            Vec3::new(size, -size, z),
            Vec3::new(size, size, z),
            Vec3::new(-size, size, z),
        );
        fb.fill_triangle(p, [a, b, c], color);
        fb.fill_triangle(p, [a, c, d], color);
    }

    #[test]
    fn test_triangle_covers_centre() {
        let p = projector(64, 64);
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(Rgb::BLACK);
        quad(&mut fb, &p, 0.0, 1.0, Rgb::WHITE);
        assert_eq!(fb.pixel(32, 32), Rgb::WHITE);
        assert_eq!(fb.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let p = projector(64, 64);
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(Rgb::BLACK);
        let red = Rgb::new(1.0, 0.0, 0.0);
        let blue = Rgb::new(0.0, 0.0, 1.0);
        quad(&mut fb, &p, 1.0, 1.0, red);
        quad(&mut fb, &p, -1.0, 1.0, blue);
        assert_eq!(fb.pixel(32, 32), red);
    }

    #[test]
    fn test_either_winding_is_drawn() {
        let p = projector(32, 32);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Rgb::BLACK);
        let (a, b, c) = (Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        fb.fill_triangle(&p, [a, c, b], Rgb::WHITE);
        assert_eq!(fb.pixel(16, 16), Rgb::WHITE);
    }

    #[test]
    fn test_behind_camera_is_clipped() {
        let p = projector(32, 32);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Rgb::BLACK);
        quad(&mut fb, &p, 10.0, 1.0, Rgb::WHITE);
        assert!(fb.pixels().iter().all(|&px| px == 0));
    }

    #[test]
    fn test_near_clip_keeps_visible_part() {
        let p = projector(32, 32);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Rgb::BLACK);
        // floor strip running from behind the camera to far in front
        let y = -1.0;
        let tri = [Vec3::new(-5.0, y, 20.0), Vec3::new(5.0, y, 20.0), Vec3::new(0.0, y, -50.0)];
        fb.fill_triangle(&p, tri, Rgb::WHITE);
        assert!(fb.pixels().iter().any(|&px| px != 0));
    }

    #[test]
    fn test_blend_does_not_write_depth() {
        let p = projector(32, 32);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Rgb::BLACK);
        let (a, b, c) = (Vec3::new(-2.0, -2.0, 0.0), Vec3::new(2.0, -2.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        fb.draw_triangle(&p, [a, b, c], [Vec2::ZERO; 3], Fill::Blend { color: Rgb::WHITE, alpha: 0.5 });
        let px = fb.pixel(16, 16);
        assert!((px.r - 0.5).abs() < 0.01);
        assert_eq!(fb.depth_at(16, 16), f32::INFINITY);
    }

    #[test]
    fn test_line_is_drawn() {
        let p = projector(32, 32);
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(Rgb::BLACK);
        fb.draw_line(&p, Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Rgb::WHITE);
        assert_eq!(fb.pixel(16, 16), Rgb::WHITE);
    }

    #[test]
    fn test_point_before_near_plane_is_skipped() {
        let p = projector(32, 32);
        assert!(p.project_point(Vec3::new(0.0, 0.0, 10.0)).is_none());
        let (x, y, _) = p.project_point(Vec3::ZERO).unwrap();
        assert!((x - 16.0).abs() < 1e-3 && (y - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_to_image_matches_pixels() {
        let mut fb = Framebuffer::new(4, 2);
        fb.clear(Rgb::from_hex(0x88ccff));
        let image = fb.to_image();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1).0, [0x88, 0xcc, 0xff]);
    }
}
