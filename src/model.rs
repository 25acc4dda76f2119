//! Scene model: named objects, materials and lights, read-only while tracing.

use std::collections::HashMap;

use cgmath::prelude::*;
use cgmath::{Matrix4, Point3, Vector3};

use crate::bvh::SpatialIndex;
use crate::color::Color;
use crate::intersect::{Interaction, Ray};
use crate::stats;
use crate::triangle::{Hit, Triangle};
use crate::Float;

/// Surface properties, immutable once attached to an object by name
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    /// Specular coefficient
    pub ks: Float,
    /// Shininess exponent
    pub alpha: Float,
    /// Transmission coefficient
    pub kt: Float,
    pub diffuse: Color,
}

/// Point light, created at scene load and read-only during rendering
#[derive(Clone, Debug)]
pub struct Light {
    illumination: Color,
    position: Point3<Float>,
}

impl Light {
    pub fn new(position: Point3<Float>, illumination: Color) -> Light {
        Light {
            illumination,
            position,
        }
    }

    pub fn illumination(&self) -> Color {
        self.illumination
    }

    pub fn position(&self) -> Point3<Float> {
        self.position
    }

    /// Unit vector from a surface point toward the light
    pub fn direction(&self, src: Point3<Float>) -> Vector3<Float> {
        (self.position - src).normalize()
    }
}

/// One named mesh: vertex buffer, per-vertex normals, triangle faces
/// and the spatial index built over them
pub struct Object {
    vertices: Vec<Point3<Float>>,
    normals: Vec<Vector3<Float>>,
    faces: Vec<[u32; 3]>,
    material: String,
    index: Option<SpatialIndex>,
}

impl Object {
    pub fn new(material: &str) -> Object {
        Object {
            vertices: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
            material: material.to_string(),
            index: None,
        }
    }

    pub fn push_vertex(&mut self, v: Point3<Float>) {
        self.vertices.push(v);
    }

    pub fn push_normal(&mut self, n: Vector3<Float>) {
        self.normals.push(n.normalize());
    }

    pub fn push_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    /// Transform every vertex (and normal) in place.
    /// Invalidates the spatial index: it has to be rebuilt before
    /// the object can be traced again.
    pub fn transform(&mut self, mat: Matrix4<Float>) {
        for v in &mut self.vertices {
            *v = Point3::from_homogeneous(mat * v.to_homogeneous());
        }
        for n in &mut self.normals {
            *n = (mat * n.extend(0.0)).truncate().normalize();
        }
        self.index = None;
    }

    pub fn index(&self) -> Option<&SpatialIndex> {
        self.index.as_ref()
    }

    /// (Re)build the spatial index over the current geometry.
    /// Degenerate faces are skipped with a warning.
    pub fn build_index(&mut self) -> Result<(), String> {
        let mut triangles = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            let mut p = [Point3::origin(); 3];
            let mut n = [Vector3::zero(); 3];
            for (i, &vi) in face.iter().enumerate() {
                let vi = vi as usize;
                if vi >= self.vertices.len() {
                    return Err(format!(
                        "Face references vertex {} but object has only {} vertices!",
                        vi,
                        self.vertices.len()
                    ));
                }
                p[i] = self.vertices[vi];
                if vi < self.normals.len() {
                    n[i] = self.normals[vi];
                }
            }
            // Fall back to the geometric normal when the scene gives none
            if n.iter().any(|n| n.magnitude2() == 0.0) {
                let ng = (p[1] - p[0]).cross(p[2] - p[0]);
                if ng.magnitude2() == 0.0 {
                    eprintln!("Skipping degenerate face {:?}", face);
                    continue;
                }
                let ng = ng.normalize();
                for slot in n.iter_mut() {
                    if slot.magnitude2() == 0.0 {
                        *slot = ng;
                    }
                }
            }
            match Triangle::build(p, n) {
                Ok(tri) => triangles.push(tri),
                Err(warning) => eprintln!("Skipping face {:?}: {}", face, warning),
            }
        }
        if triangles.is_empty() {
            return Err("Object has no tracable triangles!".to_string());
        }
        let index = SpatialIndex::build(triangles);
        stats::record_index(index.len(), index.node_count());
        self.index = Some(index);
        Ok(())
    }
}

/// The whole scene, built once at load time.
/// Effectively immutable for the duration of a render: objects are only
/// mutated by the single-threaded transform/build step before tracing.
#[derive(Default)]
pub struct Model {
    objects: HashMap<String, Object>,
    materials: HashMap<String, Material>,
    lights: Vec<Light>,
}

impl Model {
    pub fn new() -> Model {
        Model::default()
    }

    pub fn add_object(&mut self, name: &str, object: Object) {
        self.objects.insert(name.to_string(), object);
    }

    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.get_mut(name)
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Build (or rebuild) every object's spatial index.
    /// Must complete before any render thread starts.
    pub fn build_indices(&mut self) -> Result<(), String> {
        for (name, object) in &mut self.objects {
            object
                .build_index()
                .map_err(|e| format!("{}: {}", name, e))?;
        }
        Ok(())
    }

    /// Nearest intersection against every object's index.
    /// A miss is a normal outcome, not an error.
    pub fn intersect(
        &self,
        ray: &Ray,
        node_stack: &mut Vec<(usize, Float)>,
    ) -> Option<Interaction<'_>> {
        let mut ray = ray.clone();
        let mut closest: Option<(Hit, &str)> = None;
        for object in self.objects.values() {
            let index = object
                .index()
                .expect("Object index not built before tracing!");
            // The index shortens ray.length on a hit, culling across objects
            if let Some(hit) = index.intersect(&mut ray, node_stack) {
                closest = Some((hit, object.material()));
            }
        }
        closest.map(|(hit, mat_name)| {
            let mat = self
                .material(mat_name)
                .expect("Object references unknown material!");
            hit.interaction(mat)
        })
    }
}
