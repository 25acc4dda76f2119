use cgmath::prelude::*;
use cgmath::Point3;

use crate::consts;
use crate::intersect::{Intersect, Ray};
use crate::Float;

#[derive(Clone, Debug)]
pub struct Aabb {
    pub min: Point3<Float>,
    pub max: Point3<Float>,
}

pub fn min_point(p1: &Point3<Float>, p2: &Point3<Float>) -> Point3<Float> {
    let mut p_min = Point3::origin();
    for i in 0..3 {
        p_min[i] = p1[i].min(p2[i]);
    }
    p_min
}

pub fn max_point(p1: &Point3<Float>, p2: &Point3<Float>) -> Point3<Float> {
    let mut p_max = Point3::origin();
    for i in 0..3 {
        p_max[i] = p1[i].max(p2[i]);
    }
    p_max
}

impl Aabb {
    /// Box that contains nothing and grows around anything added to it
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(consts::INFINITY, consts::INFINITY, consts::INFINITY),
            max: Point3::new(-consts::INFINITY, -consts::INFINITY, -consts::INFINITY),
        }
    }

    /// Update the bounding box with new position
    pub fn add_point(&mut self, new_pos: &Point3<Float>) {
        self.min = min_point(&self.min, new_pos);
        self.max = max_point(&self.max, new_pos);
    }

    /// Update the bounding box to enclose other aswell
    pub fn add_aabb(&mut self, other: &Aabb) {
        self.min = min_point(&self.min, &other.min);
        self.max = max_point(&self.max, &other.max);
    }

    pub fn center(&self) -> Point3<Float> {
        Point3::midpoint(self.min, self.max)
    }

    pub fn longest_edge_i(&self) -> usize {
        let mut longest = -consts::INFINITY;
        let mut index = 0;
        for i in 0..3 {
            let length = self.max[i] - self.min[i];
            if length > longest {
                longest = length;
                index = i;
            }
        }
        index
    }
}

impl Intersect<'_, Float> for Aabb {
    /// Slab test. Returns the distance to the entry point,
    /// or None when the ray misses the box entirely.
    fn intersect(&self, ray: &Ray) -> Option<Float> {
        let mut t_min = -consts::INFINITY;
        let mut t_max = consts::INFINITY;
        for i in 0..3 {
            let (slab_near, slab_far) = if ray.neg_dir[i] {
                (self.max[i], self.min[i])
            } else {
                (self.min[i], self.max[i])
            };
            let t_near = (slab_near - ray.orig[i]) * ray.reciprocal_dir[i];
            let t_far = (slab_far - ray.orig[i]) * ray.reciprocal_dir[i];
            t_min = t_min.max(t_near);
            t_max = t_max.min(t_far);
            if t_min > t_max {
                return None;
            }
        }
        if t_max < 0.0 || t_min > ray.length {
            None
        } else {
            Some(t_min.max(0.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn unit_box() -> Aabb {
        let mut aabb = Aabb::empty();
        aabb.add_point(&Point3::new(-1.0, -1.0, -1.0));
        aabb.add_point(&Point3::new(1.0, 1.0, 1.0));
        aabb
    }

    #[test]
    fn ray_hits_box() {
        let aabb = unit_box();
        let ray = Ray::from_dir(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = aabb.intersect(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-6);
    }

    #[test]
    fn ray_misses_box() {
        let aabb = unit_box();
        let ray = Ray::from_dir(Point3::new(0.0, 3.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect(&ray).is_none());
        // Box behind the origin
        let ray = Ray::from_dir(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect(&ray).is_none());
    }

    #[test]
    fn ray_starting_inside() {
        let aabb = unit_box();
        let ray = Ray::from_dir(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(aabb.intersect(&ray), Some(0.0));
    }

    #[test]
    fn grows_around_points() {
        let aabb = unit_box();
        assert_eq!(aabb.center(), Point3::new(0.0, 0.0, 0.0));
        let mut long = aabb.clone();
        long.add_point(&Point3::new(5.0, 0.0, 0.0));
        assert_eq!(long.longest_edge_i(), 0);
    }
}
