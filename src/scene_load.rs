//! Loader for the line-based scene description format.
//!
//! Every line starts with a keyword: `camera`, `light`, `material`,
//! `object`, `v`, `vn`, `f` or `transform`. Geometry lines apply to the
//! most recently opened `object`. Face indices are 1-based.

use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::str::SplitWhitespace;

use cgmath::prelude::*;
use cgmath::{Matrix4, Point3, Vector3, Vector4};

use crate::camera::{Camera, CameraParams};
use crate::color::Color;
use crate::model::{Light, Material, Model, Object};
use crate::Float;

/// Parse a single integer from the split input line
fn parse_int(split_line: &mut SplitWhitespace) -> Option<u32> {
    let item = split_line.next()?;
    item.parse().ok()
}

/// Parse a single float from the split input line
fn parse_float(split_line: &mut SplitWhitespace) -> Option<Float> {
    let item = split_line.next()?;
    item.parse().ok()
}

/// Parse three floats from the split input line
fn parse_float3(split_line: &mut SplitWhitespace) -> Option<[Float; 3]> {
    let mut float3 = [0.0; 3];
    for slot in &mut float3 {
        let item = split_line.next()?;
        *slot = item.parse().ok()?;
    }
    Some(float3)
}

/// Parse a string from the split input line
fn parse_string(split_line: &mut SplitWhitespace) -> Option<String> {
    let string = split_line.next()?;
    Some(string.to_string())
}

/// Parse a row-major 4x4 transform from the split input line
fn parse_matrix(split_line: &mut SplitWhitespace) -> Option<Matrix4<Float>> {
    let mut rows = [Vector4::new(0.0, 0.0, 0.0, 0.0); 4];
    for row in &mut rows {
        for i in 0..4 {
            row[i] = parse_float(split_line)?;
        }
    }
    Some(Matrix4::from_cols(rows[0], rows[1], rows[2], rows[3]).transpose())
}

/// Load a scene found at the given path
pub fn load(scene_path: &Path) -> Result<(Model, Camera), Box<dyn Error>> {
    let scene_file = File::open(scene_path)?;
    from_reader(BufReader::new(scene_file))
}

fn from_reader<R: BufRead>(reader: R) -> Result<(Model, Camera), Box<dyn Error>> {
    let mut model = Model::new();
    let mut camera = None;
    let mut current: Option<(String, Object)> = None;

    for (line_i, line) in reader.lines().enumerate() {
        let line = line?;
        let mut split_line = line.split_whitespace();
        let err_line = |what: &str| -> Box<dyn Error> {
            format!("Line {}: {}", line_i + 1, what).into()
        };
        let key = match split_line.next() {
            Some(key) => key,
            None => continue,
        };
        match key {
            "camera" => {
                let fp = parse_float3(&mut split_line).ok_or_else(|| err_line("bad focal point"))?;
                let vpn = parse_float3(&mut split_line)
                    .ok_or_else(|| err_line("bad view-plane normal"))?;
                let vup = parse_float3(&mut split_line).ok_or_else(|| err_line("bad up vector"))?;
                let d = parse_float(&mut split_line).ok_or_else(|| err_line("bad distance"))?;
                let width = parse_int(&mut split_line).ok_or_else(|| err_line("bad width"))?;
                let height = parse_int(&mut split_line).ok_or_else(|| err_line("bad height"))?;
                let params = CameraParams {
                    fp: Point3::new(fp[0], fp[1], fp[2]),
                    vpn: Vector3::new(vpn[0], vpn[1], vpn[2]),
                    vup: Vector3::new(vup[0], vup[1], vup[2]),
                    d,
                    width,
                    height,
                };
                camera = Some(Camera::new(&params)?);
            }
            "light" => {
                let p = parse_float3(&mut split_line)
                    .ok_or_else(|| err_line("bad light position"))?;
                let c = parse_float3(&mut split_line).ok_or_else(|| err_line("bad light color"))?;
                model.add_light(Light::new(
                    Point3::new(p[0], p[1], p[2]),
                    Color::new(c[0], c[1], c[2]),
                ));
            }
            "material" => {
                let name =
                    parse_string(&mut split_line).ok_or_else(|| err_line("material without a name"))?;
                let ks = parse_float(&mut split_line).ok_or_else(|| err_line("bad ks"))?;
                let alpha = parse_float(&mut split_line).ok_or_else(|| err_line("bad alpha"))?;
                let kt = parse_float(&mut split_line).ok_or_else(|| err_line("bad kt"))?;
                let c = parse_float3(&mut split_line)
                    .ok_or_else(|| err_line("bad diffuse color"))?;
                model.add_material(Material {
                    name,
                    ks,
                    alpha,
                    kt,
                    diffuse: Color::new(c[0], c[1], c[2]),
                });
            }
            "object" => {
                if let Some((name, object)) = current.take() {
                    model.add_object(&name, object);
                }
                let name =
                    parse_string(&mut split_line).ok_or_else(|| err_line("object without a name"))?;
                let material = parse_string(&mut split_line)
                    .ok_or_else(|| err_line("object without a material"))?;
                current = Some((name, Object::new(&material)));
            }
            "v" => {
                let (_, object) = current
                    .as_mut()
                    .ok_or_else(|| err_line("vertex outside an object"))?;
                let p = parse_float3(&mut split_line).ok_or_else(|| err_line("bad vertex"))?;
                object.push_vertex(Point3::new(p[0], p[1], p[2]));
            }
            "vn" => {
                let (_, object) = current
                    .as_mut()
                    .ok_or_else(|| err_line("normal outside an object"))?;
                let n = parse_float3(&mut split_line).ok_or_else(|| err_line("bad normal"))?;
                object.push_normal(Vector3::new(n[0], n[1], n[2]));
            }
            "f" => {
                let (_, object) = current
                    .as_mut()
                    .ok_or_else(|| err_line("face outside an object"))?;
                let mut face = [0u32; 3];
                for slot in &mut face {
                    let i = parse_int(&mut split_line).ok_or_else(|| err_line("bad face index"))?;
                    if i == 0 {
                        return Err(err_line("face indices are 1-based"));
                    }
                    *slot = i - 1;
                }
                object.push_face(face);
            }
            "transform" => {
                let (_, object) = current
                    .as_mut()
                    .ok_or_else(|| err_line("transform outside an object"))?;
                let mat =
                    parse_matrix(&mut split_line).ok_or_else(|| err_line("bad transform"))?;
                object.transform(mat);
            }
            _ => {
                if !key.starts_with('#') {
                    println!("Unrecognised key {}", key);
                }
            }
        }
    }
    if let Some((name, object)) = current.take() {
        model.add_object(&name, object);
    }
    // Every object has to name a defined material
    for object in model.objects() {
        if model.material(object.material()).is_none() {
            return Err(format!("Undefined material '{}'", object.material()).into());
        }
    }
    let camera = camera.ok_or("Scene does not define a camera")?;
    Ok((model, camera))
}
