use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer, Luma};
use std::path::Path;

use crate::color::ColorImage;
use crate::error::{Result, SimError};
use crate::scene::Scene;
use crate::sensor::BitDepth;
use crate::sensor::adc::PixelBuffer;

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Resize an image to fit within the sensor, preserving aspect ratio, and
/// convert it to a normalized luminance scene. The uncovered border is black.
pub fn scene_from_image(img: &DynamicImage, sensor_w: usize, sensor_h: usize) -> Scene {
    let (iw, ih) = img.dimensions();
    let scale = f64::min(
        sensor_w as f64 / iw.max(1) as f64,
        sensor_h as f64 / ih.max(1) as f64,
    );
    let new_w = ((iw as f64 * scale).round() as usize).min(sensor_w);
    let new_h = ((ih as f64 * scale).round() as usize).min(sensor_h);

    let resized = img
        .resize_exact(new_w as u32, new_h as u32, image::imageops::FilterType::Lanczos3)
        .to_luma16();
    let offset_x = (sensor_w - new_w) / 2;
    let offset_y = (sensor_h - new_h) / 2;

    Scene::from_fn(sensor_w, sensor_h, |row, col| {
        if row < offset_y || col < offset_x || row >= offset_y + new_h || col >= offset_x + new_w {
            return 0.0;
        }
        let p = resized.get_pixel((col - offset_x) as u32, (row - offset_y) as u32);
        p[0] as f64 / 65535.0
    })
}

/// Write a scene as 8-bit grayscale, clipping to `[0, 1]`.
pub fn save_scene(scene: &Scene, path: &Path) -> Result<()> {
    let mut img = GrayImage::new(scene.width() as u32, scene.height() as u32);
    for row in 0..scene.height() {
        for col in 0..scene.width() {
            let v = (scene.get(row, col).clamp(0.0, 1.0) * 255.0).round() as u8;
            img.put_pixel(col as u32, row as u32, Luma([v]));
        }
    }
    img.save(path)?;
    Ok(())
}

/// Write a raw mosaic as grayscale: 8-bit for 8-bit sensors, 16-bit otherwise.
pub fn save_raw(
    raw: &PixelBuffer,
    width: usize,
    height: usize,
    bit_depth: BitDepth,
    path: &Path,
) -> Result<()> {
    if raw.len() != width * height {
        return Err(SimError::InvalidBuffer {
            expected: width * height,
            got: raw.len(),
        });
    }
    if bit_depth == BitDepth::Eight {
        let data: Vec<u8> = raw.to_f64().iter().map(|&v| v.round().clamp(0.0, 255.0) as u8).collect();
        let img: GrayImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            Luma([data[y as usize * width + x as usize]])
        });
        img.save(path)?;
    } else {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
                let v = raw.get(y as usize * width + x as usize);
                Luma([v.round().clamp(0.0, 65535.0) as u16])
            });
        img.save(path)?;
    }
    Ok(())
}

/// Write the 8-bit preview of a reconstructed image.
pub fn save_color_image(img: &ColorImage, path: &Path) -> Result<()> {
    img.to_rgb8().save(path)?;
    Ok(())
}
