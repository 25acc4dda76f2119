use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign};

use cgmath::prelude::*;
use cgmath::Vector3;

use crate::Float;

/// Linear RGB color used by the shading code
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    color: Vector3<Float>,
}

impl Color {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self {
            color: Vector3::new(r, g, b),
        }
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub fn r(&self) -> Float {
        self.color.x
    }

    pub fn g(&self) -> Float {
        self.color.y
    }

    pub fn b(&self) -> Float {
        self.color.z
    }

    pub fn is_black(&self) -> bool {
        self.color.x == 0.0 && self.color.y == 0.0 && self.color.z == 0.0
    }

    /// Clamp each channel to [0, 1]
    pub fn clamped(self) -> Self {
        Self::new(
            self.color.x.min(1.0).max(0.0),
            self.color.y.min(1.0).max(0.0),
            self.color.z.min(1.0).max(0.0),
        )
    }

    pub fn into_arr(self) -> [f32; 3] {
        [
            self.color.x as f32,
            self.color.y as f32,
            self.color.z as f32,
        ]
    }

    /// Convert to an 8-bit pixel, clamping out-of-range radiance
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.color.x * 255.0).round() as u8,
            (c.color.y * 255.0).round() as u8,
            (c.color.z * 255.0).round() as u8,
        ]
    }
}

impl Index<usize> for Color {
    type Output = Float;

    fn index(&self, i: usize) -> &Float {
        &self.color[i]
    }
}

impl Add for Color {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        self.color += rhs.color;
    }
}

impl Mul for Color {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, rhs: Self) {
        self.color.mul_assign_element_wise(rhs.color);
    }
}

impl Mul<Float> for Color {
    type Output = Self;

    fn mul(mut self, rhs: Float) -> Self {
        self *= rhs;
        self
    }
}

impl MulAssign<Float> for Color {
    fn mul_assign(&mut self, rhs: Float) {
        self.color *= rhs;
    }
}

impl Mul<Color> for Float {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl Div<Float> for Color {
    type Output = Self;

    fn div(mut self, rhs: Float) -> Self {
        self /= rhs;
        self
    }
}

impl DivAssign<Float> for Color {
    fn div_assign(&mut self, rhs: Float) {
        self.color *= rhs.recip();
    }
}
