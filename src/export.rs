use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;
use thiserror::Error;

use crate::render::Renderer;
use crate::solution::Solution;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("frame {index} out of range, solution has {count} frames")]
    FrameOutOfRange { index: usize, count: usize },

    #[error("a {grid_size}x{grid_size} grid at {cell_size} px per cell is too large to render")]
    ImageTooLarge { grid_size: usize, cell_size: u32 },

    #[error("malformed solution: {0}")]
    Malformed(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Reads a solution previously saved as JSON.
pub fn load_solution(path: &Path) -> ExportResult<Solution> {
    let bytes = fs::read(path)?;
    let solution: Solution = serde_json::from_slice(&bytes)?;
    solution.check_shape().map_err(ExportError::Malformed)?;
    Ok(solution)
}

pub fn save_solution(solution: &Solution, path: &Path) -> ExportResult<()> {
    let json = serde_json::to_vec(solution)?;
    fs::write(path, json)?;
    Ok(())
}

pub struct ImageExporter {
    renderer: Renderer,
}

impl ImageExporter {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn export_frame_png(
        &self,
        solution: &Solution,
        index: usize,
        path: &Path,
    ) -> ExportResult<()> {
        let frame = solution
            .frame(index)
            .ok_or(ExportError::FrameOutOfRange {
                index,
                count: solution.frame_count(),
            })?;
        let img = self.renderer.render_frame(frame, solution.grid_size)?;
        img.save(path)?;
        Ok(())
    }

    /// Writes every frame as `{prefix}_frame_{index:04}.png` under
    /// `output_dir`. Frames are rendered and encoded in parallel.
    pub fn export_frame_sequence(
        &self,
        solution: &Solution,
        output_dir: &Path,
        prefix: &str,
    ) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let paths = solution
            .frames
            .par_iter()
            .enumerate()
            .map(|(index, frame)| {
                let path = output_dir.join(format!("{prefix}_frame_{index:04}.png"));
                let img = self.renderer.render_frame(frame, solution.grid_size)?;
                img.save(&path)?;
                Ok(path)
            })
            .collect::<ExportResult<Vec<_>>>()?;

        info!(
            "exported {} frames to {}",
            paths.len(),
            output_dir.display()
        );
        Ok(paths)
    }
}

impl Default for ImageExporter {
    fn default() -> Self {
        Self::new(Renderer::new(8))
    }
}
