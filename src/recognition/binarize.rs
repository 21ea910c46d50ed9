//! Snapshot preprocessing for the recognizer.

use image::{GrayImage, Luma, RgbImage, imageops};

/// Converts an RGB snapshot to a two-level image with dark ink on white.
///
/// Ink intensity is the brightest channel of each pixel, so every palette
/// color reads as full-strength ink regardless of hue. The intensity mask is
/// inverted, then thresholded: inverted values strictly above `threshold`
/// become 255, all others 0.
pub fn binarize(snapshot: &RgbImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::from_fn(snapshot.width(), snapshot.height(), |x, y| {
        let [r, g, b] = snapshot.get_pixel(x, y).0;
        Luma([r.max(g).max(b)])
    });
    imageops::invert(&mut mask);

    for pixel in mask.pixels_mut() {
        *pixel = Luma([if pixel.0[0] > threshold { 255 } else { 0 }]);
    }
    mask
}
