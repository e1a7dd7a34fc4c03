use crate::model::TrimInfo;
use image::RgbaImage;

/// Bounds of the pixels whose alpha is at least `max(1, threshold)`.
///
/// `trimmed` is set only when the bounds are smaller than the image.
/// A fully transparent image is reported untrimmed at full size.
pub fn compute_trim(rgba: &RgbaImage, threshold: u8) -> TrimInfo {
    let (w, h) = rgba.dimensions();
    let alpha = threshold.max(1);
    let opaque_col = |x: u32| (0..h).any(|y| rgba.get_pixel(x, y)[3] >= alpha);

    let Some(x1) = (0..w).find(|&x| opaque_col(x)) else {
        return TrimInfo::full(w, h);
    };
    let x2 = (x1..w).rev().find(|&x| opaque_col(x)).unwrap_or(x1);
    let opaque_row = |y: u32| (x1..=x2).any(|x| rgba.get_pixel(x, y)[3] >= alpha);
    let y1 = (0..h).find(|&y| opaque_row(y)).unwrap_or(0);
    let y2 = (y1..h).rev().find(|&y| opaque_row(y)).unwrap_or(y1);

    let tw = x2 - x1 + 1;
    let th = y2 - y1 + 1;
    TrimInfo {
        trimmed: tw != w || th != h,
        x: x1,
        y: y1,
        width: tw,
        height: th,
    }
}
