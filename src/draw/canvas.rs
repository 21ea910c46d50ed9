//! Persistent ink canvas backed by a cairo RGB24 image surface.

use super::color::{BLACK, Color};
use image::RgbImage;
use thiserror::Error;

/// Errors raised while creating or reading raster surfaces.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Surface data is still borrowed: {0}")]
    Borrow(#[from] cairo::BorrowError),
}

/// Raster buffer that accumulates ink between frames.
///
/// Starts all-zero (black). Lines and erase discs are drawn without
/// antialiasing so the recognizer sees crisp two-level ink after binarization.
/// Coordinates outside the surface are clipped by cairo.
pub struct Canvas {
    surface: cairo::ImageSurface,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Canvas {
    /// Allocates an all-zero canvas of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let surface = create_rgb_surface(width, height)?;
        let mut canvas = Self {
            surface,
            width,
            height,
        };
        canvas.clear()?;
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if the canvas already has the given dimensions.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    /// Draws a straight segment between two pixel coordinates.
    pub fn draw_line(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        color: Color,
        thickness: f64,
    ) -> Result<(), CanvasError> {
        let ctx = self.context()?;
        color.set_source(&ctx);
        ctx.set_line_width(thickness);
        ctx.set_line_cap(cairo::LineCap::Round);
        ctx.set_line_join(cairo::LineJoin::Round);
        ctx.move_to(from.0 as f64, from.1 as f64);
        ctx.line_to(to.0 as f64, to.1 as f64);
        ctx.stroke()?;
        Ok(())
    }

    /// Fills a disc with the empty (black) color.
    pub fn erase_disc(&mut self, center: (i32, i32), radius: f64) -> Result<(), CanvasError> {
        let ctx = self.context()?;
        BLACK.set_source(&ctx);
        ctx.arc(
            center.0 as f64,
            center.1 as f64,
            radius,
            0.0,
            2.0 * std::f64::consts::PI,
        );
        ctx.fill()?;
        Ok(())
    }

    /// Resets every pixel to zero.
    pub fn clear(&mut self) -> Result<(), CanvasError> {
        let ctx = self.context()?;
        BLACK.set_source(&ctx);
        ctx.paint()?;
        Ok(())
    }

    /// Returns true iff every pixel is zero.
    pub fn is_blank(&self) -> bool {
        let width = self.width as usize;
        let height = self.height as usize;
        let stride = self.surface.stride() as usize;
        let mut blank = true;

        let read = self.surface.with_data(|data| {
            blank = (0..height).all(|y| {
                let row = &data[y * stride..y * stride + width * 4];
                row.chunks_exact(4).all(|px| rgb_of(px) == [0, 0, 0])
            });
        });

        if let Err(err) = read {
            log::warn!("Could not read canvas pixels: {err}");
            return false;
        }
        blank
    }

    /// Reads a single pixel as `[r, g, b]`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.surface.stride() as usize + x as usize * 4;
        let mut value = None;
        let _ = self.surface.with_data(|data| {
            value = Some(rgb_of(&data[offset..offset + 4]));
        });
        value
    }

    /// Copies the canvas into an owned RGB image (the recognition snapshot).
    pub fn snapshot(&self) -> Result<RgbImage, CanvasError> {
        surface_to_image(&self.surface)
    }

    /// The backing surface, for compositing.
    pub fn surface(&self) -> &cairo::ImageSurface {
        &self.surface
    }

    fn context(&self) -> Result<cairo::Context, CanvasError> {
        let ctx = cairo::Context::new(&self.surface)?;
        ctx.set_antialias(cairo::Antialias::None);
        ctx.set_operator(cairo::Operator::Source);
        Ok(ctx)
    }
}

/// Creates an RGB24 surface, rejecting empty or oversized dimensions.
pub fn create_rgb_surface(width: u32, height: u32) -> Result<cairo::ImageSurface, CanvasError> {
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(CanvasError::InvalidDimensions { width, height });
    }
    Ok(cairo::ImageSurface::create(
        cairo::Format::Rgb24,
        width as i32,
        height as i32,
    )?)
}

/// Copies an RGB24 surface into an owned RGB image.
pub fn surface_to_image(surface: &cairo::ImageSurface) -> Result<RgbImage, CanvasError> {
    let stride = surface.stride() as usize;
    let mut image = RgbImage::new(surface.width().max(0) as u32, surface.height().max(0) as u32);

    surface.with_data(|data| {
        for (x, y, px) in image.enumerate_pixels_mut() {
            let offset = y as usize * stride + x as usize * 4;
            px.0 = rgb_of(&data[offset..offset + 4]);
        }
    })?;

    Ok(image)
}

/// Extracts `[r, g, b]` from one native-endian RGB24 pixel.
pub(crate) fn rgb_of(px: &[u8]) -> [u8; 3] {
    let value = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
    [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ]
}

/// Encodes `[r, g, b]` as one native-endian RGB24 pixel.
pub(crate) fn rgb_to_pixel(rgb: [u8; 3]) -> [u8; 4] {
    let value = 0xff00_0000 | ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | (rgb[2] as u32);
    value.to_ne_bytes()
}
