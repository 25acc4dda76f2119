use cgmath::prelude::*;
use cgmath::{Point3, Vector3};

use crate::consts;
use crate::model::Material;
use crate::stats;
use crate::Float;

pub trait Intersect<'a, H> {
    fn intersect(&'a self, ray: &Ray) -> Option<H>;
}

#[derive(Clone, Debug)]
pub struct Ray {
    pub orig: Point3<Float>,
    /// Pre-normalized direction
    pub dir: Vector3<Float>,
    pub length: Float,
    // For more efficient ray box intersections
    pub reciprocal_dir: Vector3<Float>,
    pub neg_dir: [bool; 3],
}

impl Ray {
    fn new(orig: Point3<Float>, dir: Vector3<Float>, length: Float) -> Ray {
        stats::count_ray();
        let reciprocal_dir = 1.0 / dir;
        let neg_dir = [dir.x < 0.0, dir.y < 0.0, dir.z < 0.0];
        Ray {
            orig,
            dir,
            length,
            reciprocal_dir,
            neg_dir,
        }
    }

    /// Infinite ray with a given direction and origin.
    /// The origin is nudged along the direction so that secondary rays
    /// don't re-hit the surface they start from.
    pub fn from_dir(mut orig: Point3<Float>, dir: Vector3<Float>) -> Ray {
        orig += consts::EPSILON * dir;
        Ray::new(orig, dir, consts::INFINITY)
    }

    /// Infinite ray from origin towards another point
    pub fn towards(orig: Point3<Float>, to: Point3<Float>) -> Ray {
        let dir = (to - orig).normalize();
        Ray::new(orig, dir, consts::INFINITY)
    }
}

/// Fully resolved surface hit: everything the shading needs
pub struct Interaction<'a> {
    /// Hit point in world space
    pub p: Point3<Float>,
    /// Interpolated shading normal, unit length
    pub n: Vector3<Float>,
    pub mat: &'a Material,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn towards_normalizes() {
        let ray = Ray::towards(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, -7.0));
        assert!((ray.dir.magnitude() - 1.0).abs() < 1e-12);
        assert_eq!(ray.dir.z, -1.0);
        assert!(ray.neg_dir[2]);
        assert!(!ray.neg_dir[0]);
    }
}
