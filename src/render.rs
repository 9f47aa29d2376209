use image::{ImageBuffer, Rgb, RgbImage};

use crate::export::{ExportError, ExportResult};
use crate::solution::{Frame, Pigment};

const GRID_LINE: Rgb<u8> = Rgb([200, 200, 200]);

/// Rasterizes solution frames, one `cell_size` square per grid cell.
pub struct Renderer {
    cell_size: u32,
    grid_lines: bool,
}

impl Renderer {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            grid_lines: false,
        }
    }

    pub fn with_grid_lines(mut self, grid_lines: bool) -> Self {
        self.grid_lines = grid_lines;
        self
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Side length in pixels, or `None` if it does not fit in a `u32`.
    pub fn image_size(&self, grid_size: usize) -> Option<u32> {
        u32::try_from(grid_size)
            .ok()
            .and_then(|cells| cells.checked_mul(self.cell_size))
    }

    pub fn render_frame(&self, frame: &Frame, grid_size: usize) -> ExportResult<RgbImage> {
        let side = self
            .image_size(grid_size)
            .ok_or(ExportError::ImageTooLarge {
                grid_size,
                cell_size: self.cell_size,
            })?;
        let pigments = frame.pigments();
        let mut img = ImageBuffer::new(side, side);

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let col = (x / self.cell_size) as usize;
            let row = (y / self.cell_size) as usize;

            let on_line = self.grid_lines
                && self.cell_size > 2
                && (x % self.cell_size == 0 || y % self.cell_size == 0);

            *pixel = if on_line {
                GRID_LINE
            } else {
                let pigment = pigments
                    .get(row * grid_size + col)
                    .copied()
                    .unwrap_or(Pigment::None);
                Rgb(pigment.rgb())
            };
        }

        Ok(img)
    }
}
