//! Response frame rendering: camera frame, ink and interface chrome.

use image::RgbImage;

use crate::config::UiConfig;
use crate::draw::canvas::{create_rgb_surface, rgb_of, rgb_to_pixel};
use crate::draw::{Canvas, CanvasError, Color, WHITE, YELLOW};
use crate::input::{HandLandmarks, SessionState};
use crate::util;

// ============================================================================
// Layout Constants (not configurable)
// ============================================================================

/// Left edge of the status and result text
const TEXT_X: f64 = 50.0;
/// Status baseline distance from the bottom edge
const STATUS_BOTTOM_OFFSET: f64 = 30.0;
/// Result baseline distance above the status baseline
const RESULT_LINE_GAP: f64 = 40.0;
/// Text background padding
const TEXT_BG_PAD: f64 = 4.0;
/// Text background opacity
const TEXT_BG_ALPHA: f64 = 0.6;

/// Progress bar size and placement (from the right/bottom edges)
const PROGRESS_WIDTH: f64 = 150.0;
const PROGRESS_HEIGHT: f64 = 20.0;
const PROGRESS_RIGHT_OFFSET: f64 = 200.0;
const PROGRESS_ALPHA: f64 = 0.7;
/// The bar stays hidden until this fraction of the idle period has passed
const PROGRESS_MIN_VISIBLE: f64 = 0.1;

/// Outline width around the selected palette cell
const SELECTION_OUTLINE_WIDTH: f64 = 4.0;

const STATUS_TEXT_COLOR: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};
const LANDMARK_COLOR: Color = Color {
    r: 0.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};

/// Keypoint pairs forming the hand skeleton.
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Everything drawn on top of the camera frame.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    pub state: &'a SessionState,
    pub canvas: Option<&'a Canvas>,
    pub hand: Option<&'a HandLandmarks>,
    /// Fraction of the idle threshold elapsed, if recognition is pending
    pub progress: Option<f64>,
}

/// Renders the response frame.
///
/// Non-black canvas pixels replace the frame's pixels; the palette, the
/// hand skeleton, the mode label, the idle progress bar and the last result
/// are then drawn over the merged image.
pub fn compose(
    frame: &RgbImage,
    overlay: &Overlay<'_>,
    ui: &UiConfig,
) -> Result<cairo::ImageSurface, CanvasError> {
    let (width, height) = frame.dimensions();
    let mut surface = create_rgb_surface(width, height)?;
    blit_frame_and_ink(&mut surface, frame, overlay.canvas)?;

    let ctx = cairo::Context::new(&surface)?;
    render_palette(&ctx, overlay.state);
    if ui.show_landmarks {
        if let Some(hand) = overlay.hand {
            render_hand(&ctx, hand, width, height);
        }
    }

    let status_y = height as f64 - STATUS_BOTTOM_OFFSET;
    render_label(
        &ctx,
        &format!("Mode: {}", overlay.state.mode().label()),
        TEXT_X,
        status_y,
        STATUS_TEXT_COLOR,
        ui,
    );

    if overlay.state.mode().shows_outcome() {
        let line = result_line(overlay.state.detected_text(), overlay.state.result_text());
        let result_y = status_y - RESULT_LINE_GAP;
        render_label(&ctx, &line, TEXT_X, result_y, WHITE, ui);
    }

    if ui.show_progress {
        if let Some(progress) = overlay.progress.filter(|p| *p > PROGRESS_MIN_VISIBLE) {
            render_progress_bar(
                &ctx,
                progress,
                width as f64 - PROGRESS_RIGHT_OFFSET,
                status_y,
            );
        }
    }

    drop(ctx);
    surface.flush();
    Ok(surface)
}

/// Text shown next to the outcome, e.g. `12*3 = 36`.
pub fn result_line(detected: &str, result: &str) -> String {
    if detected.trim().is_empty() {
        format!("= {}", result)
    } else {
        format!("{} = {}", detected.trim(), result)
    }
}

fn blit_frame_and_ink(
    surface: &mut cairo::ImageSurface,
    frame: &RgbImage,
    canvas: Option<&Canvas>,
) -> Result<(), CanvasError> {
    let stride = surface.stride() as usize;
    let (width, height) = frame.dimensions();
    let canvas = canvas.filter(|c| {
        let matches = c.matches(width, height);
        if !matches {
            log::warn!(
                "Canvas is {}x{} but frame is {}x{}; skipping ink",
                c.width(),
                c.height(),
                width,
                height
            );
        }
        matches
    });

    let mut data = surface.data()?;
    for (x, y, px) in frame.enumerate_pixels() {
        let offset = y as usize * stride + x as usize * 4;
        data[offset..offset + 4].copy_from_slice(&rgb_to_pixel(px.0));
    }

    if let Some(canvas) = canvas {
        let ink_stride = canvas.surface().stride() as usize;
        canvas.surface().with_data(|ink| {
            for y in 0..height as usize {
                for x in 0..width as usize {
                    let src = y * ink_stride + x * 4;
                    let rgb = rgb_of(&ink[src..src + 4]);
                    if rgb != [0, 0, 0] {
                        let dst = y * stride + x * 4;
                        data[dst..dst + 4].copy_from_slice(&rgb_to_pixel(rgb));
                    }
                }
            }
        })?;
    }

    Ok(())
}

fn render_palette(ctx: &cairo::Context, state: &SessionState) {
    let palette = &state.palette;
    let cell_width = palette.cell_width() as f64;
    let cell_height = palette.height() as f64;

    for (i, entry) in palette.entries().iter().enumerate() {
        let x = i as f64 * cell_width;
        entry.color.set_source(ctx);
        ctx.rectangle(x, 0.0, cell_width, cell_height);
        let _ = ctx.fill();

        if state.selected_color_index() == Some(i) {
            YELLOW.set_source(ctx);
            ctx.set_line_width(SELECTION_OUTLINE_WIDTH);
            ctx.rectangle(x, 0.0, cell_width, cell_height);
            let _ = ctx.stroke();
        }
    }
}

fn render_hand(ctx: &cairo::Context, hand: &HandLandmarks, width: u32, height: u32) {
    let px = |i: usize| {
        let p = hand.point(i);
        let (x, y) = util::normalized_to_pixel(p.x, p.y, width, height);
        (x as f64, y as f64)
    };

    LANDMARK_COLOR.set_source(ctx);
    ctx.set_line_width(2.0);
    for (a, b) in HAND_CONNECTIONS {
        let (ax, ay) = px(a);
        let (bx, by) = px(b);
        ctx.move_to(ax, ay);
        ctx.line_to(bx, by);
    }
    let _ = ctx.stroke();

    ctx.set_source_rgb(1.0, 0.0, 0.0);
    for i in 0..hand.points().len() {
        let (x, y) = px(i);
        ctx.arc(x, y, 3.0, 0.0, 2.0 * std::f64::consts::PI);
        let _ = ctx.fill();
    }
}

/// Draws one line of text with its baseline at `y` over a dark background.
fn render_label(ctx: &cairo::Context, text: &str, x: f64, y: f64, color: Color, ui: &UiConfig) {
    ctx.save().ok();

    let layout = pangocairo::functions::create_layout(ctx);
    let font_desc = pango::FontDescription::from_string(&format!(
        "{} Bold {}",
        ui.font_family, ui.status_font_size
    ));
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    let (_ink_rect, logical_rect) = layout.extents();
    let scale = pango::SCALE as f64;
    let text_width = logical_rect.width() as f64 / scale;
    let text_height = logical_rect.height() as f64 / scale;
    let baseline = layout.baseline() as f64 / scale;
    let top = y - baseline;

    if text_width > 0.0 && text_height > 0.0 {
        ctx.set_source_rgba(0.0, 0.0, 0.0, TEXT_BG_ALPHA);
        ctx.rectangle(
            x - TEXT_BG_PAD,
            top - TEXT_BG_PAD,
            text_width + TEXT_BG_PAD * 2.0,
            text_height + TEXT_BG_PAD * 2.0,
        );
        let _ = ctx.fill();
    }

    color.set_source(ctx);
    ctx.move_to(x, top);
    pangocairo::functions::show_layout(ctx, &layout);

    ctx.restore().ok();
}

fn render_progress_bar(ctx: &cairo::Context, progress: f64, x: f64, y: f64) {
    let filled = progress.clamp(0.0, 1.0) * PROGRESS_WIDTH;

    let gray = 50.0 / 255.0;
    ctx.set_source_rgba(gray, gray, gray, PROGRESS_ALPHA);
    ctx.rectangle(x, y, PROGRESS_WIDTH, PROGRESS_HEIGHT);
    let _ = ctx.fill();

    ctx.set_source_rgba(YELLOW.r, YELLOW.g, YELLOW.b, PROGRESS_ALPHA);
    ctx.rectangle(x, y, filled, PROGRESS_HEIGHT);
    let _ = ctx.fill();
}
