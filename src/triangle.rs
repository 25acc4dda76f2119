use cgmath::prelude::*;
use cgmath::{Matrix4, Point3, Vector3};

use crate::aabb::{self, Aabb};
use crate::intersect::{Interaction, Intersect, Ray};
use crate::model::Material;
use crate::Float;

/// Tracable triangle. Owns copies of its vertex data:
/// triangles are rebuilt whenever the owning object's spatial
/// index is, so they always match the transformed geometry.
#[derive(Clone, Debug)]
pub struct Triangle {
    p: [Point3<Float>; 3],
    /// Per-vertex shading normals
    n: [Vector3<Float>; 3],
    to_barycentric: Matrix4<Float>,
}

impl Triangle {
    /// Build a triangle from vertex positions and shading normals.
    /// Degenerate (zero area) triangles are rejected.
    pub fn build(p: [Point3<Float>; 3], n: [Vector3<Float>; 3]) -> Result<Triangle, String> {
        let to_barycentric = Self::world_to_barycentric(p[0], p[1], p[2])
            .ok_or_else(|| "Degenerate triangle!".to_string())?;
        Ok(Triangle {
            p,
            n,
            to_barycentric,
        })
    }

    /// Compute the conversion from world space to barycentric space
    fn world_to_barycentric(
        p1: Point3<Float>,
        p2: Point3<Float>,
        p3: Point3<Float>,
    ) -> Option<Matrix4<Float>> {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let z = e1.cross(e2);
        if z.magnitude2() == 0.0 {
            return None;
        }
        let from_barycentric = Matrix4::from_cols(
            e1.extend(0.0),
            e2.extend(0.0),
            z.normalize().extend(0.0),
            p1.to_homogeneous(),
        );
        from_barycentric.invert()
    }

    /// Geometric normal, unit length
    pub fn normal(&self) -> Vector3<Float> {
        (self.p[1] - self.p[0]).cross(self.p[2] - self.p[0]).normalize()
    }

    /// Barycentric position and interpolated shading normal
    pub fn bary_pn(&self, u: Float, v: Float) -> (Point3<Float>, Vector3<Float>) {
        let b1 = 1.0 - u - v;
        let p = b1 * self.p[0] + u * self.p[1].to_vec() + v * self.p[2].to_vec();
        let n = (b1 * self.n[0] + u * self.n[1] + v * self.n[2]).normalize();
        (p, n)
    }

    pub fn aabb(&self) -> Aabb {
        let mut min = self.p[0];
        min = aabb::min_point(&min, &self.p[1]);
        min = aabb::min_point(&min, &self.p[2]);
        let mut max = self.p[0];
        max = aabb::max_point(&max, &self.p[1]);
        max = aabb::max_point(&max, &self.p[2]);
        Aabb { min, max }
    }

    pub fn center(&self) -> Point3<Float> {
        Point3::centroid(&self.p)
    }
}

#[derive(Debug)]
pub struct Hit<'a> {
    pub tri: &'a Triangle,
    pub t: Float,
    pub u: Float,
    pub v: Float,
}

impl<'a> Intersect<'a, Hit<'a>> for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        let bary_o = self.to_barycentric * ray.orig.to_homogeneous();
        let bary_d = self.to_barycentric * ray.dir.extend(0.0);
        let t = -bary_o.z / bary_d.z;
        let u = bary_o.x + t * bary_d.x;
        let v = bary_o.y + t * bary_d.y;
        if u >= 0.0 && v >= 0.0 && u + v <= 1.0 && t > 0.0 && t < ray.length {
            Some(Hit { tri: self, t, u, v })
        } else {
            None
        }
    }
}

impl<'a> Hit<'a> {
    pub fn interaction(&self, mat: &'a Material) -> Interaction<'a> {
        let (p, n) = self.tri.bary_pn(self.u, self.v);
        Interaction { p, n, mat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_triangle() -> Triangle {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = [Vector3::new(0.0, 0.0, 1.0); 3];
        Triangle::build(p, n).unwrap()
    }

    #[test]
    fn hit_inside() {
        let tri = xy_triangle();
        let ray = Ray::from_dir(Point3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = tri.intersect(&ray).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-6);
        let isect_p = tri.bary_pn(hit.u, hit.v).0;
        assert!((isect_p.x - 0.25).abs() < 1e-9);
        assert!((isect_p.y - 0.25).abs() < 1e-9);
    }

    #[test]
    fn miss_outside() {
        let tri = xy_triangle();
        let ray = Ray::from_dir(Point3::new(0.75, 0.75, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(tri.intersect(&ray).is_none());
        // Triangle behind the ray
        let ray = Ray::from_dir(Point3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn degenerate_is_rejected() {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let n = [Vector3::new(0.0, 0.0, 1.0); 3];
        assert!(Triangle::build(p, n).is_err());
    }
}
