//! Camera with an orthonormal view basis derived from raw scene parameters.

use cgmath::prelude::*;
use cgmath::{Matrix4, Point3, Rad, Vector3, Vector4};

use crate::consts;
use crate::float::ToFloat;
use crate::intersect::Ray;
use crate::Float;

/// Camera-local axis selector for translate/rotate
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Raw camera parameters as they appear in a scene file
#[derive(Clone, Debug)]
pub struct CameraParams {
    /// Focal point
    pub fp: Point3<Float>,
    /// View-plane normal
    pub vpn: Vector3<Float>,
    /// Up vector
    pub vup: Vector3<Float>,
    /// Distance from the focal point to the view plane
    pub d: Float,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct Camera {
    fp: Point3<Float>,
    n: Vector3<Float>,
    u: Vector3<Float>,
    v: Vector3<Float>,
    fl: Float,
    vrp: Point3<Float>,
    pub width: u32,
    pub height: u32,
}

impl Camera {
    /// Derive the view basis from raw scene parameters.
    ///
    /// The derivation order matters: `u = vup × n` and `v = n × u` are
    /// both taken before any of the three is normalized, so `v` sees the
    /// un-normalized `u`/`n` relationship.
    pub fn new(params: &CameraParams) -> Result<Camera, String> {
        if params.d == 0.0 {
            return Err("Camera distance d must be non-zero!".to_string());
        }
        let n = params.vpn;
        let u = params.vup.cross(n);
        let v = n.cross(u);
        if n.magnitude2() < consts::EPSILON {
            return Err("Degenerate view-plane normal!".to_string());
        }
        if u.magnitude2() < consts::EPSILON {
            return Err("Up vector is parallel to the view-plane normal!".to_string());
        }
        let n = n.normalize();
        let u = u.normalize();
        let v = v.normalize();
        let fl = -params.d;
        let mut camera = Camera {
            fp: params.fp,
            n,
            u,
            v,
            fl,
            vrp: params.fp,
            width: params.width,
            height: params.height,
        };
        camera.update_vrp();
        Ok(camera)
    }

    fn update_vrp(&mut self) {
        self.vrp = self.fp + self.n * (-self.fl);
    }

    pub fn fp(&self) -> Point3<Float> {
        self.fp
    }

    pub fn u(&self) -> Vector3<Float> {
        self.u
    }

    pub fn v(&self) -> Vector3<Float> {
        self.v
    }

    pub fn n(&self) -> Vector3<Float> {
        self.n
    }

    pub fn vrp(&self) -> Point3<Float> {
        self.vrp
    }

    pub fn fl(&self) -> Float {
        self.fl
    }

    /// Horizontal pixel range is [umin, umax] inclusive
    pub fn umin(&self) -> i32 {
        -(self.width as i32 / 2)
    }

    pub fn umax(&self) -> i32 {
        self.umin() + self.width as i32 - 1
    }

    /// Vertical pixel range is [vmin, vmax] inclusive
    pub fn vmin(&self) -> i32 {
        -(self.height as i32 / 2)
    }

    pub fn vmax(&self) -> i32 {
        self.vmin() + self.height as i32 - 1
    }

    /// Move the focal point along one of the camera's own axes
    pub fn translate(&mut self, amount: Float, which: Axis) {
        match which {
            Axis::X => self.fp += self.u * amount,
            Axis::Y => self.fp += self.v * amount,
            Axis::Z => self.fp += self.n * amount,
        }
        self.update_vrp();
    }

    /// Rotate the camera by `amount` radians about an axis through `around`.
    /// The rotation axis is the camera's own `v` (for `Axis::X`) or `u`
    /// (for `Axis::Y`); rotation about the z-axis is a documented no-op.
    ///
    /// Rotating into a frame where the axis is the z-axis, applying a plain
    /// z-rotation and rotating back, with translations re-centering on the
    /// pivot: `T(around) · Rᵀ · Rz(amount) · R · T(-around)`.
    pub fn rotate(&mut self, amount: Float, around: Point3<Float>, which: Axis) -> Result<(), String> {
        let axis = match which {
            Axis::X => self.v,
            Axis::Y => self.u,
            Axis::Z => return Ok(()),
        };
        if axis.magnitude2() < consts::EPSILON {
            return Err("Degenerate rotation axis!".to_string());
        }
        let w2 = axis.normalize();
        let w0 = perpendicular(w2)?;
        let w1 = w0.cross(w2).normalize();

        // Rows of R are the local frame, so R maps the frame onto x/y/z
        let r_t = Matrix4::from_cols(
            w0.extend(0.0),
            w1.extend(0.0),
            w2.extend(0.0),
            Vector4::unit_w(),
        );
        let r = r_t.transpose();
        let rotat = r_t * Matrix4::from_angle_z(Rad(amount)) * r;

        let to_pivot = Matrix4::from_translation(-around.to_vec());
        let from_pivot = Matrix4::from_translation(around.to_vec());
        let m = from_pivot * rotat * to_pivot;

        self.fp = Point3::from_homogeneous(m * self.fp.to_homogeneous());
        self.n = (rotat * self.n.extend(0.0)).truncate().normalize();
        self.u = (rotat * self.u.extend(0.0)).truncate().normalize();
        self.v = (rotat * self.v.extend(0.0)).truncate().normalize();
        self.update_vrp();
        Ok(())
    }

    /// Perspective projection matrix. The w-row divides by the focal
    /// length, so applying this followed by a homogeneous divide yields
    /// screen-space coordinates.
    pub fn projection(&self) -> Matrix4<Float> {
        let mut proj = Matrix4::identity();
        // Row 3, column 2 in row-major terms
        proj[2][3] = 1.0 / self.fl;
        proj[3][3] = 0.0;
        proj
    }

    /// View matrix (world to camera): R · T(-fp) with rows u, v, n
    pub fn rotation(&self) -> Matrix4<Float> {
        let rota = Matrix4::from_cols(
            self.u.extend(0.0),
            self.v.extend(0.0),
            self.n.extend(0.0),
            Vector4::unit_w(),
        )
        .transpose();
        rota * Matrix4::from_translation(-self.fp.to_vec())
    }

    /// Primary ray through pixel (x, y) of the view plane:
    /// `L = vrp + u·x + v·y`, direction from the focal point through L.
    pub fn ray_through(&self, x: i32, y: i32) -> Ray {
        let l = self.vrp + self.u * x.to_float() + self.v * y.to_float();
        Ray::towards(self.fp, l)
    }
}

/// Any unit vector perpendicular to v, seeded from the principal axis
/// least aligned with it
fn perpendicular(v: Vector3<Float>) -> Result<Vector3<Float>, String> {
    let abs = v.map(Float::abs);
    let seed = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::unit_x()
    } else if abs.y <= abs.z {
        Vector3::unit_y()
    } else {
        Vector3::unit_z()
    };
    let perp = v.cross(seed);
    if perp.magnitude2() < consts::EPSILON {
        return Err("Degenerate rotation axis!".to_string());
    }
    Ok(perp.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> CameraParams {
        CameraParams {
            fp: Point3::new(0.0, 0.0, 5.0),
            vpn: Vector3::new(0.0, 0.0, -1.0),
            vup: Vector3::new(0.0, 1.0, 0.0),
            d: 5.0,
            width: 16,
            height: 16,
        }
    }

    fn assert_orthonormal(cam: &Camera) {
        assert!((cam.u().magnitude() - 1.0).abs() < 1e-9);
        assert!((cam.v().magnitude() - 1.0).abs() < 1e-9);
        assert!((cam.n().magnitude() - 1.0).abs() < 1e-9);
        assert!(cam.u().dot(cam.v()).abs() < 1e-9);
        assert!(cam.u().dot(cam.n()).abs() < 1e-9);
        assert!(cam.v().dot(cam.n()).abs() < 1e-9);
    }

    #[test]
    fn basis_derivation_order() {
        let cam = Camera::new(&test_params()).unwrap();
        assert_orthonormal(&cam);
        // u = vup × vpn flips the x-axis for this view
        assert!((cam.u() - Vector3::new(-1.0, 0.0, 0.0)).magnitude() < 1e-12);
        assert!((cam.v() - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-12);
        // vrp sits d in front of the focal point along n
        assert!((cam.vrp() - Point3::new(0.0, 0.0, 0.0)).magnitude() < 1e-12);
        assert_eq!(cam.fl(), -5.0);
    }

    #[test]
    fn degenerate_parameters_are_reported() {
        let mut params = test_params();
        params.vup = Vector3::new(0.0, 0.0, 2.0); // parallel to vpn
        assert!(Camera::new(&params).is_err());

        let mut params = test_params();
        params.d = 0.0;
        assert!(Camera::new(&params).is_err());
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut params = test_params();
        params.vpn = Vector3::new(0.3, -1.2, 0.4);
        params.vup = Vector3::new(0.1, 0.9, 0.2);
        let mut cam = Camera::new(&params).unwrap();
        let pivot = Point3::new(1.0, 2.0, -3.0);
        cam.translate(2.5, Axis::X);
        cam.rotate(0.7, pivot, Axis::X).unwrap();
        cam.translate(-1.0, Axis::Z);
        cam.rotate(-1.3, pivot, Axis::Y).unwrap();
        cam.rotate(0.2, Point3::origin(), Axis::X).unwrap();
        cam.translate(0.75, Axis::Y);
        assert_orthonormal(&cam);
    }

    #[test]
    fn translate_moves_along_basis() {
        let mut cam = Camera::new(&test_params()).unwrap();
        let u = cam.u();
        let fp = cam.fp();
        cam.translate(3.0, Axis::X);
        assert!((cam.fp() - (fp + 3.0 * u)).magnitude() < 1e-12);
        // vrp follows the focal point
        assert!((cam.vrp() - (cam.fp() + cam.n() * 5.0)).magnitude() < 1e-12);
    }

    #[test]
    fn full_turn_is_identity() {
        for &axis in &[Axis::X, Axis::Y] {
            let mut cam = Camera::new(&test_params()).unwrap();
            let (fp, u, v, n) = (cam.fp(), cam.u(), cam.v(), cam.n());
            cam.rotate(2.0 * consts::PI, Point3::new(2.0, -1.0, 7.0), axis)
                .unwrap();
            assert!((cam.fp() - fp).magnitude() < 1e-6);
            assert!((cam.u() - u).magnitude() < 1e-6);
            assert!((cam.v() - v).magnitude() < 1e-6);
            assert!((cam.n() - n).magnitude() < 1e-6);
        }
    }

    #[test]
    fn z_rotation_is_noop() {
        let mut cam = Camera::new(&test_params()).unwrap();
        let (fp, u, v, n) = (cam.fp(), cam.u(), cam.v(), cam.n());
        cam.rotate(1.0, Point3::new(5.0, 5.0, 5.0), Axis::Z).unwrap();
        assert_eq!(cam.fp(), fp);
        assert_eq!(cam.u(), u);
        assert_eq!(cam.v(), v);
        assert_eq!(cam.n(), n);
    }

    #[test]
    fn projection_divide_keeps_offset_signs() {
        let mut params = test_params();
        params.d = -2.0; // fl = 2
        let cam = Camera::new(&params).unwrap();
        let proj = cam.projection();
        let p = Vector4::new(0.5, -0.3, 2.0, 1.0);
        let projected = proj * p;
        assert!(projected.w != 0.0);
        let sx = projected.x / projected.w;
        let sy = projected.y / projected.w;
        assert!(sx > 0.0);
        assert!(sy < 0.0);
    }

    #[test]
    fn view_matrix_centers_camera() {
        let cam = Camera::new(&test_params()).unwrap();
        let view = cam.rotation();
        let at_origin = view * cam.fp().to_homogeneous();
        assert!(at_origin.truncate().magnitude() < 1e-12);
        // A point one unit ahead along n lands on the camera z-axis
        let ahead = view * (cam.fp() + cam.n()).to_homogeneous();
        assert!((ahead.truncate() - Vector3::new(0.0, 0.0, 1.0)).magnitude() < 1e-12);
    }

    #[test]
    fn identity_transform_is_bitwise_exact() {
        let v = Vector4::new(0.123_456_789, -42.5, 1e-30, 1.0);
        let out = Matrix4::identity() * v;
        assert_eq!(v, out);
    }

    #[test]
    fn center_ray_points_along_n() {
        let cam = Camera::new(&test_params()).unwrap();
        let ray = cam.ray_through(0, 0);
        assert!((ray.dir - cam.n()).magnitude() < 1e-12);
        assert_eq!(ray.orig, cam.fp());
    }
}
