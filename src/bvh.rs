use std::ops::Index;

use cgmath::Point3;

use crate::aabb::Aabb;
use crate::intersect::{Intersect, Ray};
use crate::triangle::{Hit, Triangle};
use crate::Float;

const MAX_LEAF_SIZE: usize = 8;

enum Indices {
    Inner(u32, u32),
    Leaf(u32, u32),
}

pub struct BvhNode {
    aabb: Aabb,
    indices: Indices,
}

impl BvhNode {
    fn new(triangles: &Triangles) -> BvhNode {
        let start_i = triangles.start_i as u32;
        let end_i = start_i + triangles.len() as u32;
        BvhNode {
            aabb: triangles.aabb.clone(),
            indices: Indices::Leaf(start_i, end_i),
        }
    }

    fn convert_to_inner(&mut self, left_child: usize, right_child: usize) {
        self.indices = Indices::Inner(left_child as u32, right_child as u32);
    }
}

impl Intersect<'_, Float> for BvhNode {
    fn intersect(&self, ray: &Ray) -> Option<Float> {
        self.aabb.intersect(ray)
    }
}

/// Working set of one build step: a slice of the index permutation
/// plus the bounding box of the triangles it refers to.
struct Triangles<'a> {
    triangles: &'a [Triangle],
    centers: &'a [Point3<Float>],
    indices: &'a mut [usize],
    aabb: Aabb,
    /// Node contains indices [start_i, start_i + len) from the main indices array
    start_i: usize,
}

impl<'a> Triangles<'a> {
    fn new(
        triangles: &'a [Triangle],
        centers: &'a [Point3<Float>],
        indices: &'a mut [usize],
        start_i: usize,
    ) -> Triangles<'a> {
        let mut aabb = Aabb::empty();
        for &i in indices.iter() {
            aabb.add_aabb(&triangles[i].aabb());
        }
        Triangles {
            triangles,
            centers,
            indices,
            aabb,
            start_i,
        }
    }

    fn sort_longest_axis(&mut self) {
        let axis_i = self.aabb.longest_edge_i();
        let centers = self.centers;
        self.indices.sort_unstable_by(|&i1, &i2| {
            let c1 = centers[i1][axis_i];
            let c2 = centers[i2][axis_i];
            c1.partial_cmp(&c2).unwrap()
        });
    }

    fn split(self, i: usize) -> (Triangles<'a>, Triangles<'a>) {
        let (i1, i2) = self.indices.split_at_mut(i);
        let node1 = Triangles::new(self.triangles, self.centers, i1, self.start_i);
        let node2 = Triangles::new(self.triangles, self.centers, i2, self.start_i + i);
        (node1, node2)
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

impl Index<usize> for Triangles<'_> {
    type Output = Triangle;

    fn index(&self, i: usize) -> &Triangle {
        let i = self.indices[i];
        &self.triangles[i]
    }
}

pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build the tree with object median splits along the longest axis.
    /// Returns the tree and the permutation the triangle array
    /// must be reordered by for the leaf ranges to be valid.
    fn build(triangles: &[Triangle]) -> (Bvh, Vec<usize>) {
        assert!(!triangles.is_empty(), "Object doesn't contain any triangles!");
        let centers: Vec<Point3<Float>> = triangles.iter().map(|tri| tri.center()).collect();
        let mut permutation: Vec<usize> = (0..triangles.len()).collect();
        let tris = Triangles::new(triangles, &centers, &mut permutation, 0);
        let mut nodes = Vec::new();
        nodes.push(BvhNode::new(&tris));
        let mut split_stack = vec![(0usize, tris)];

        while let Some((node_i, mut tris)) = split_stack.pop() {
            if tris.len() <= MAX_LEAF_SIZE {
                continue;
            }
            tris.sort_longest_axis();
            let mid = tris.len() / 2;
            let (t1, t2) = tris.split(mid);

            let left_child = BvhNode::new(&t1);
            let left_child_i = nodes.len();
            if t1.len() > MAX_LEAF_SIZE {
                split_stack.push((left_child_i, t1));
            }
            nodes.push(left_child);

            let right_child = BvhNode::new(&t2);
            let right_child_i = nodes.len();
            if t2.len() > MAX_LEAF_SIZE {
                split_stack.push((right_child_i, t2));
            }
            nodes.push(right_child);
            nodes[node_i].convert_to_inner(left_child_i, right_child_i);
        }
        nodes.shrink_to_fit();
        (Bvh { nodes }, permutation)
    }

    fn get_children(&self, node: &BvhNode) -> Option<(usize, usize)> {
        match node.indices {
            Indices::Leaf(_, _) => None,
            Indices::Inner(left_i, right_i) => Some((left_i as usize, right_i as usize)),
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}

/// Per-object acceleration structure. Answers nearest-intersection
/// queries against a fixed snapshot of the object's geometry;
/// immutable once built, so workers may query it concurrently.
pub struct SpatialIndex {
    triangles: Vec<Triangle>,
    bvh: Bvh,
}

impl SpatialIndex {
    pub fn build(mut triangles: Vec<Triangle>) -> SpatialIndex {
        let (bvh, permutation) = Bvh::build(&triangles);
        apply_permutation(&mut triangles, &permutation);
        SpatialIndex { triangles, bvh }
    }

    /// Nearest intersection along the ray, or None.
    /// Shortens ray.length to the hit distance so follow-up queries
    /// against other objects can cull early. The node stack is caller
    /// provided scratch space so the hot loop doesn't reallocate.
    pub fn intersect<'a>(
        &'a self,
        ray: &mut Ray,
        node_stack: &mut Vec<(usize, Float)>,
    ) -> Option<Hit<'a>> {
        debug_assert!(node_stack.is_empty());
        let mut closest_hit: Option<Hit> = None;
        node_stack.push((0, 0.0));
        while let Some((node_i, t)) = node_stack.pop() {
            let node = &self.bvh.nodes[node_i];
            // We've already found a closer hit
            if closest_hit.as_ref().map_or(false, |hit| hit.t <= t) {
                continue;
            }
            if let Indices::Leaf(start_i, end_i) = node.indices {
                for tri in &self.triangles[start_i as usize..end_i as usize] {
                    if let Some(hit) = tri.intersect(ray) {
                        ray.length = hit.t;
                        closest_hit = Some(hit);
                    }
                }
            } else {
                let (left_i, right_i) = self.bvh.get_children(node).unwrap();
                let mut push = |child_i: usize| {
                    if let Some(t_child) = self.bvh.nodes[child_i].intersect(ray) {
                        node_stack.push((child_i, t_child));
                    }
                };
                push(left_i);
                push(right_i);
            }
        }
        closest_hit
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn node_count(&self) -> usize {
        self.bvh.size()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

fn apply_permutation<T>(values: &mut Vec<T>, permutation: &[usize]) {
    let mut reordered: Vec<T> = Vec::with_capacity(values.len());
    let mut taken: Vec<Option<T>> = values.drain(..).map(Some).collect();
    for &i in permutation {
        reordered.push(taken[i].take().expect("Invalid permutation!"));
    }
    *values = reordered;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::prelude::*;
    use cgmath::Vector3;

    /// Row of unit triangles in the z = 0 plane, one per integer x slot
    fn triangle_row(count: usize) -> Vec<Triangle> {
        let n = [Vector3::new(0.0, 0.0, 1.0); 3];
        (0..count)
            .map(|i| {
                let x = i as Float * 2.0;
                Triangle::build(
                    [
                        Point3::new(x, 0.0, 0.0),
                        Point3::new(x + 1.0, 0.0, 0.0),
                        Point3::new(x, 1.0, 0.0),
                    ],
                    n,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn finds_nearest_of_stacked_triangles() {
        let n = [Vector3::new(0.0, 0.0, 1.0); 3];
        let mut tris = Vec::new();
        for z in &[3.0, 1.0, 2.0] {
            tris.push(
                Triangle::build(
                    [
                        Point3::new(-1.0, -1.0, *z),
                        Point3::new(1.0, -1.0, *z),
                        Point3::new(0.0, 1.0, *z),
                    ],
                    n,
                )
                .unwrap(),
            );
        }
        let index = SpatialIndex::build(tris);
        let mut stack = Vec::new();
        let mut ray = Ray::from_dir(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = index.intersect(&mut ray, &mut stack).unwrap();
        // Nearest plane is z = 3, seven units away
        assert!((hit.t - 7.0).abs() < 1e-6);
    }

    #[test]
    fn splits_past_leaf_size() {
        let tris = triangle_row(4 * MAX_LEAF_SIZE);
        let index = SpatialIndex::build(tris);
        assert!(index.bvh.size() > 1);
        assert_eq!(index.len(), 4 * MAX_LEAF_SIZE);

        let mut stack = Vec::new();
        // Every triangle is still reachable after the permutation
        for i in 0..4 * MAX_LEAF_SIZE {
            let x = i as Float * 2.0 + 0.25;
            let mut ray = Ray::from_dir(Point3::new(x, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));
            assert!(
                index.intersect(&mut ray, &mut stack).is_some(),
                "missed triangle {}",
                i
            );
        }
    }

    #[test]
    fn miss_returns_none() {
        let index = SpatialIndex::build(triangle_row(3));
        let mut stack = Vec::new();
        let mut ray = Ray::from_dir(Point3::new(0.0, 10.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(index.intersect(&mut ray, &mut stack).is_none());
    }
}
