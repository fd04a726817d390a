// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Court image loading.
//!
//! This module loads the optional court background image and converts it to
//! RGBA pixels usable both by egui textures and the recording rasterizer.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// Decode an image file into RGBA8 pixels.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    let rgba = img.to_rgba8();
    log::info!("Loaded court image {} ({}x{})", path.display(), rgba.width(), rgba.height());
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("court.png");
        RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255])).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("nope.png")).is_err());
    }
}
