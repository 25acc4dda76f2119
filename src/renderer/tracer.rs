use cgmath::prelude::*;

use crate::color::Color;
use crate::intersect::Ray;
use crate::model::Model;
use crate::Float;

use super::RenderConfig;

/// Whitted-style trace: direct Phong lighting at the nearest hit plus
/// recursive reflection and transmission, capped at `config.max_depth`.
pub fn trace(
    ray: &Ray,
    model: &Model,
    config: &RenderConfig,
    depth: usize,
    node_stack: &mut Vec<(usize, Float)>,
) -> Color {
    if depth >= config.max_depth {
        return Color::black();
    }
    let isect = match model.intersect(ray, node_stack) {
        Some(isect) => isect,
        None => return config.background,
    };
    let mat = isect.mat;
    // Shade the side the ray arrived from
    let n = if isect.n.dot(ray.dir) > 0.0 {
        -isect.n
    } else {
        isect.n
    };

    let mut c = Color::black();
    for light in model.lights() {
        let l = light.direction(isect.p);
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            continue;
        }
        c += mat.diffuse * light.illumination() * n_dot_l;
        if mat.ks > 0.0 {
            let r = 2.0 * n_dot_l * n - l;
            let r_dot_v = r.dot(-ray.dir);
            if r_dot_v > 0.0 {
                c += light.illumination() * (mat.ks * r_dot_v.powf(mat.alpha));
            }
        }
    }
    if mat.ks > 0.0 {
        let refl_dir = ray.dir - 2.0 * ray.dir.dot(n) * n;
        let refl_ray = Ray::from_dir(isect.p, refl_dir.normalize());
        c += trace(&refl_ray, model, config, depth + 1, node_stack) * mat.ks;
    }
    if mat.kt > 0.0 {
        // Transmission continues straight through the surface
        let pass_ray = Ray::from_dir(isect.p, ray.dir);
        c += trace(&pass_ray, model, config, depth + 1, node_stack) * mat.kt;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Vector3};

    use crate::model::{Light, Material, Object};

    fn single_triangle_model(material: Material) -> Model {
        let mut obj = Object::new(&material.name);
        obj.push_vertex(Point3::new(-2.0, -2.0, 0.0));
        obj.push_vertex(Point3::new(2.0, -2.0, 0.0));
        obj.push_vertex(Point3::new(0.0, 2.0, 0.0));
        obj.push_face([0, 1, 2]);
        let mut model = Model::new();
        model.add_object("tri", obj);
        model.add_material(material);
        model.build_indices().unwrap();
        model
    }

    #[test]
    fn head_on_diffuse_matches_lambert() {
        let mat = Material {
            name: "gray".to_string(),
            ks: 0.0,
            alpha: 1.0,
            kt: 0.0,
            diffuse: Color::new(0.5, 0.5, 0.5),
        };
        let mut model = single_triangle_model(mat);
        // Light straight above the hit point along the surface normal
        model.add_light(Light::new(Point3::new(0.0, 0.0, 10.0), Color::white()));

        let config = RenderConfig::default();
        let mut stack = Vec::new();
        let ray = Ray::from_dir(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let c = trace(&ray, &model, &config, 0, &mut stack);
        // n . l == 1, so the result is exactly the diffuse reflectance
        assert!((c.r() - 0.5).abs() < 1e-9);
        assert!((c.g() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn miss_returns_background() {
        let mat = Material {
            name: "gray".to_string(),
            ks: 0.0,
            alpha: 1.0,
            kt: 0.0,
            diffuse: Color::new(0.5, 0.5, 0.5),
        };
        let model = single_triangle_model(mat);
        let config = RenderConfig {
            background: Color::new(0.1, 0.2, 0.3),
            ..Default::default()
        };
        let mut stack = Vec::new();
        let ray = Ray::from_dir(Point3::new(10.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let c = trace(&ray, &model, &config, 0, &mut stack);
        assert_eq!(c.r(), 0.1);
        assert_eq!(c.b(), 0.3);
    }

    #[test]
    fn recursion_terminates_between_mirrors() {
        // Two fully reflective parallel triangles bounce rays forever
        // without the depth cap.
        let mat = Material {
            name: "mirror".to_string(),
            ks: 1.0,
            alpha: 1.0,
            kt: 0.0,
            diffuse: Color::black(),
        };
        let mut model = Model::new();
        for (name, z) in &[("near", 0.0), ("far", -3.0)] {
            let mut obj = Object::new("mirror");
            obj.push_vertex(Point3::new(-5.0, -5.0, *z));
            obj.push_vertex(Point3::new(5.0, -5.0, *z));
            obj.push_vertex(Point3::new(0.0, 5.0, *z));
            obj.push_face([0, 1, 2]);
            model.add_object(name, obj);
        }
        model.add_material(mat);
        model.build_indices().unwrap();

        let config = RenderConfig::default();
        let mut stack = Vec::new();
        // Start between the mirrors so the ray ping-pongs until the cap
        let ray = Ray::from_dir(Point3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 0.0, -1.0));
        let c = trace(&ray, &model, &config, 0, &mut stack);
        assert!(c.is_black());
    }
}
