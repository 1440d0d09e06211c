// mesh.rs: UV sphere generator and ray picking against it

use crate::camera::Ray;
use glam::{Vec2, Vec3};

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub distance: f32,
    pub point: Vec3,
    pub uv: Vec2,
}

/// Latitude/longitude sphere. Row 0 is the +Y pole, and the UV `v` runs down
/// the bitmap (v = 0 is the top row), so a UV maps straight onto pixel rows.
/// Triangles wind counter-clockwise seen from outside. Indices are left alone
/// by `scale`, so mirroring one axis leaves them facing inward.
pub fn build_sphere(radius: f32, width_segments: u32, height_segments: u32) -> SphereMesh {
    let width_segments = width_segments.max(3) as usize;
    let height_segments = height_segments.max(2) as usize;

    let mut positions = Vec::with_capacity((height_segments + 1) * (width_segments + 1));
    let mut uvs = Vec::with_capacity((height_segments + 1) * (width_segments + 1));
    let mut indices = Vec::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = std::f32::consts::PI * v;

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = 2.0 * std::f32::consts::PI * u;

            positions.push([
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ]);
            uvs.push([u, v]);
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = (iy * row + ix + 1) as u32;
            let b = (iy * row + ix) as u32;
            let c = ((iy + 1) * row + ix) as u32;
            let d = ((iy + 1) * row + ix + 1) as u32;

            // poles collapse to a single triangle per quad
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh {
        positions,
        uvs,
        indices,
    }
}

impl SphereMesh {
    pub fn scale(&mut self, s: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from(*p) * s).to_array();
        }
    }

    /// Nearest front-facing triangle hit along the ray, with the UV
    /// interpolated from the triangle's corners.
    pub fn raycast(&self, ray: &Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;

        for tri in self.indices.chunks_exact(3) {
            let [ia, ib, ic] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let a = Vec3::from(self.positions[ia]);
            let b = Vec3::from(self.positions[ib]);
            let c = Vec3::from(self.positions[ic]);

            let Some((t, bu, bv)) = intersect_triangle(ray, a, b, c) else {
                continue;
            };
            if best.map_or(false, |h| h.distance <= t) {
                continue;
            }

            let uv = Vec2::from(self.uvs[ia]) * (1.0 - bu - bv)
                + Vec2::from(self.uvs[ib]) * bu
                + Vec2::from(self.uvs[ic]) * bv;
            best = Some(Hit {
                distance: t,
                point: ray.origin + ray.direction * t,
                uv,
            });
        }

        best
    }
}

/// Möller–Trumbore with back faces culled. Returns (t, u, v).
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<(f32, f32, f32)> {
    const EPS: f32 = 1e-7;

    let edge1 = b - a;
    let edge2 = c - a;
    let normal = edge1.cross(edge2);
    if ray.direction.dot(normal) >= 0.0 {
        return None;
    }

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some((t, u, v))
}
