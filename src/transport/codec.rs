//! Image encoding at the transport boundary.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::RgbImage;
use thiserror::Error;

/// Errors raised while decoding request frames or encoding responses.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Image data URL has no payload")]
    MissingPayload,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Error decoding image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Error encoding PNG: {0}")]
    Png(#[from] cairo::IoError),
}

/// Decodes a `data:image/...;base64,<payload>` URL into an RGB frame.
///
/// Everything up to the first comma is ignored; the format is sniffed from
/// the decoded bytes.
pub fn decode_data_url(url: &str) -> Result<RgbImage, CodecError> {
    let (_, payload) = url.split_once(',').ok_or(CodecError::MissingPayload)?;
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(CodecError::MissingPayload);
    }

    let bytes = STANDARD.decode(payload)?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image.to_rgb8())
}

/// Encodes a rendered surface as PNG bytes.
pub fn encode_png(surface: &cairo::ImageSurface) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    surface.write_to_png(&mut buffer)?;
    Ok(buffer)
}

/// Encodes a rendered surface as a `data:image/png;base64,...` URL.
pub fn encode_png_data_url(surface: &cairo::ImageSurface) -> Result<String, CodecError> {
    let png = encode_png(surface)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Encodes an RGB image as a PNG data URL (used for building requests).
pub fn encode_rgb_data_url(image: &RgbImage) -> Result<String, CodecError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(buffer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::canvas::create_rgb_surface;
    use image::Rgb;

    #[test]
    fn decodes_png_data_url() {
        let mut source = RgbImage::new(3, 2);
        source.put_pixel(1, 1, Rgb([200, 10, 20]));
        let url = encode_rgb_data_url(&source).unwrap();

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [200, 10, 20]);
    }

    #[test]
    fn rejects_url_without_payload() {
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(CodecError::MissingPayload)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,"),
            Err(CodecError::MissingPayload)
        ));
    }

    #[test]
    fn rejects_bad_base64_and_bad_images() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(CodecError::Base64(_))
        ));
        let junk = format!("data:image/png;base64,{}", STANDARD.encode(b"not an image"));
        assert!(matches!(decode_data_url(&junk), Err(CodecError::Image(_))));
    }

    #[test]
    fn encodes_surface_as_png_data_url() {
        let surface = create_rgb_surface(8, 8).unwrap();
        let url = encode_png_data_url(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }
}
