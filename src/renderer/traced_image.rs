use std::path::Path;

use image::{ImageError, RgbImage};

use crate::color::Color;

pub struct TracedImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
    n_writes: Vec<u32>,
}

impl TracedImage {
    pub fn empty(width: u32, height: u32) -> TracedImage {
        TracedImage {
            width,
            height,
            data: vec![0.0; (3 * width * height) as usize],
            n_writes: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Store a traced pixel. `row` 0 is the top of the image.
    pub fn write(&mut self, col: u32, row: u32, color: Color) {
        assert!(col < self.width && row < self.height, "Pixel out of bounds!");
        let i = (row * self.width + col) as usize;
        self.n_writes[i] += 1;
        self.data[3 * i..3 * i + 3].copy_from_slice(&color.into_arr());
    }

    pub fn pixel(&self, col: u32, row: u32) -> [f32; 3] {
        let i = 3 * (row * self.width + col) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// How many times each pixel slot has been written.
    /// Every slot should end up at exactly one after a full render.
    pub fn write_counts(&self) -> &[u32] {
        &self.n_writes
    }

    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        let bytes = self
            .data
            .iter()
            .map(|c| (c.max(0.0).min(1.0) * 255.0) as u8)
            .collect();
        let image = RgbImage::from_raw(self.width, self.height, bytes)
            .expect("Traced image buffer has the wrong size!");
        image.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn counts_writes_per_slot() {
        let mut image = TracedImage::empty(2, 2);
        image.write(0, 0, Color::white());
        image.write(1, 1, Color::black());
        image.write(1, 1, Color::white());
        assert_eq!(image.write_counts(), &[1, 0, 0, 2]);
        assert_eq!(image.pixel(0, 0), [1.0, 1.0, 1.0]);
        assert_eq!(image.pixel(1, 0), [0.0, 0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn rejects_out_of_bounds_write() {
        let mut image = TracedImage::empty(2, 2);
        image.write(2, 0, Color::black());
    }
}
