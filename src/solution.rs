use serde::{Deserialize, Serialize};

use crate::store::Store;

/// Concentrations of the five transported species at one sample time.
///
/// Every field is row-major with `grid_size * grid_size` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "M1")]
    pub m1: Vec<f64>,
    #[serde(rename = "M2")]
    pub m2: Vec<f64>,
    #[serde(rename = "P0")]
    pub p0: Vec<f64>,
    #[serde(rename = "P1")]
    pub p1: Vec<f64>,
    #[serde(rename = "P2")]
    pub p2: Vec<f64>,
}

/// Solver output: one [`Frame`] per entry of `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub grid_size: usize,
    pub t: Vec<f64>,
    pub frames: Vec<Frame>,
}

/// Dominant pigment of a cell, as shown on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pigment {
    /// All three pigment concentrations are zero.
    None,
    P0,
    P1,
    P2,
}

impl Pigment {
    /// Largest of the three concentrations wins; ties go to the lower index.
    pub fn classify(p0: f64, p1: f64, p2: f64) -> Self {
        if p0 + p1 + p2 == 0.0 {
            return Pigment::None;
        }
        if p0 >= p1 && p0 >= p2 {
            Pigment::P0
        } else if p1 >= p2 {
            Pigment::P1
        } else {
            Pigment::P2
        }
    }

    /// Palette: white background, tan, black and yellow pigments.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Pigment::None => [255, 255, 255],
            Pigment::P0 => [210, 180, 140],
            Pigment::P1 => [0, 0, 0],
            Pigment::P2 => [255, 255, 0],
        }
    }
}

impl Frame {
    pub fn pigments(&self) -> Vec<Pigment> {
        self.p0
            .iter()
            .zip(&self.p1)
            .zip(&self.p2)
            .map(|((&p0, &p1), &p2)| Pigment::classify(p0, p1, p2))
            .collect()
    }

    fn fields(&self) -> [(&'static str, &[f64]); 5] {
        [
            ("M1", self.m1.as_slice()),
            ("M2", self.m2.as_slice()),
            ("P0", self.p0.as_slice()),
            ("P1", self.p1.as_slice()),
            ("P2", self.p2.as_slice()),
        ]
    }
}

impl Solution {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Index of the last frame sampled at or before `time`, if any.
    pub fn frame_at(&self, time: f64) -> Option<usize> {
        self.t.iter().rposition(|&sample| sample <= time)
    }

    /// Checks that the frame count matches `t` and every field covers the
    /// whole grid. Returns a description of the first mismatch.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.frames.len() != self.t.len() {
            return Err(format!(
                "{} frames for {} sample times",
                self.frames.len(),
                self.t.len()
            ));
        }

        let cells = self
            .grid_size
            .checked_mul(self.grid_size)
            .ok_or_else(|| format!("grid size {} is too large", self.grid_size))?;
        for (index, frame) in self.frames.iter().enumerate() {
            for (name, field) in frame.fields() {
                if field.len() != cells {
                    return Err(format!(
                        "frame {index}: {name} has {} values, expected {cells}",
                        field.len()
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Latest completed solve, or `None` before any solve has finished.
pub type SolutionStore = Store<Option<Solution>>;

impl Store<Option<Solution>> {
    pub fn is_absent(&self) -> bool {
        self.get().is_none()
    }
}
