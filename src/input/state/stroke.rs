use crate::draw::{Canvas, CanvasError};
use crate::input::mode::Mode;

use super::SessionState;

impl SessionState {
    /// Applies the current mode at the index fingertip.
    ///
    /// # Behavior
    /// - Drawing: joins the previous cursor to `fingertip` with a line, then
    ///   moves the cursor there
    /// - Erasing: clears a disc of `eraser_radius` around `fingertip`; erase
    ///   positions are not interpolated, so fast motion leaves gaps
    /// - Any other mode: forgets the cursor
    pub fn render_stroke(
        &mut self,
        canvas: &mut Canvas,
        fingertip: (i32, i32),
    ) -> Result<(), CanvasError> {
        match self.mode {
            Mode::Drawing => {
                if let Some(previous) = self.cursor {
                    canvas.draw_line(previous, fingertip, self.active_color, self.thickness)?;
                }
                self.cursor = Some(fingertip);
            }
            Mode::Erasing => {
                canvas.erase_disc(fingertip, self.eraser_radius)?;
            }
            _ => {
                self.cursor = None;
            }
        }
        Ok(())
    }
}
