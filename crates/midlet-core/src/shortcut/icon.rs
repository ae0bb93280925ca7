//! Launcher icon preparation.
//!
//! Application icons come in arbitrary sizes and aspect ratios. Launchers want
//! a square bitmap, so non-square icons are center-cropped to the shorter side
//! before being scaled to the launcher icon size.

use crate::models::AppItem;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use tracing::{debug, warn};

/// Square region of a source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Centered square crop for a `width` x `height` bitmap.
///
/// Returns `None` when the bitmap is already square.
pub fn square_crop_rect(width: u32, height: u32) -> Option<CropRect> {
    if width > height {
        Some(CropRect {
            x: (width - height) / 2,
            y: 0,
            side: height,
        })
    } else if width < height {
        Some(CropRect {
            x: 0,
            y: (height - width) / 2,
            side: width,
        })
    } else {
        None
    }
}

/// Crop `image` to a centered square and scale it to `size` x `size`.
pub fn launcher_icon(image: &DynamicImage, size: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();

    let square = match square_crop_rect(width, height) {
        Some(rect) => imageops::crop_imm(&rgba, rect.x, rect.y, rect.side, rect.side).to_image(),
        None => rgba,
    };

    if square.width() == size && square.height() == size {
        return square;
    }
    imageops::resize(&square, size, size, FilterType::Triangle)
}

/// Decode the application's icon, if it has a readable one.
pub fn load_icon_bitmap(item: &AppItem) -> Option<DynamicImage> {
    let path = item.image_path_ext()?;
    match image::open(&path) {
        Ok(image) => {
            debug!("Decoded icon {} ({}x{})", path.display(), image.width(), image.height());
            Some(image)
        }
        Err(e) => {
            warn!("Cannot decode icon {}: {}", path.display(), e);
            None
        }
    }
}
