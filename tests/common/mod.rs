#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use std::path::{Path, PathBuf};

pub const GRAY: [u8; 3] = [112, 112, 112];
pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];

pub fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
    ImageBuffer::from_fn(w, h, |_x, _y| Rgb(rgb))
}

pub fn solid_dynamic(w: u32, h: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(solid(w, h, rgb))
}

/// Image whose first `left_cols` columns are `left` and the rest `right`.
pub fn split_dynamic(w: u32, h: u32, left_cols: u32, left: [u8; 3], right: [u8; 3]) -> DynamicImage {
    let buf: RgbImage = ImageBuffer::from_fn(w, h, |x, _y| if x < left_cols { Rgb(left) } else { Rgb(right) });
    DynamicImage::ImageRgb8(buf)
}

/// Writes a solid-color JPEG into `dir` and returns its path.
pub fn write_solid_jpeg(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    solid(4, 4, rgb).save(&path).expect("write jpeg fixture");
    path
}

pub fn write_jpeg(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.to_rgb8().save(&path).expect("write jpeg fixture");
    path
}

pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not a jpeg").expect("write garbage fixture");
    path
}
