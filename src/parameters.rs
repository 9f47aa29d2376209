use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Store;

/// Editable configuration of one eyespot solve.
///
/// Serialized field names follow the solver's JSON contract, which keeps the
/// chemists' capitalisation (`D1`, `A_0`, `P0_0_with_precursor`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    // Simulation
    pub grid_size: usize,
    pub time_span: (f64, f64),
    pub time_step: f64,

    // Kinetics and diffusion
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
    pub k5: f64,
    #[serde(rename = "D1")]
    pub d1: f64,
    #[serde(rename = "D2")]
    pub d2: f64,

    // Initial conditions
    #[serde(rename = "A_0")]
    pub a_0: f64,
    #[serde(rename = "M1_0")]
    pub m1_0: f64,
    #[serde(rename = "M2_0")]
    pub m2_0: f64,
    #[serde(rename = "P0_0")]
    pub p0_0: f64,
    #[serde(rename = "P1_0")]
    pub p1_0: f64,
    #[serde(rename = "P2_0")]
    pub p2_0: f64,
    #[serde(rename = "P0_0_with_precursor")]
    pub p0_0_with_precursor: f64,
    #[serde(rename = "A0_0_with_precursor")]
    pub a0_0_with_precursor: f64,

    /// Draw grid lines over the canvas. Not used by the solver.
    #[serde(default = "default_grid")]
    pub grid: bool,
}

fn default_grid() -> bool {
    true
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            grid_size: 21,
            time_span: (0.0, 15.0),
            time_step: 0.1,
            k1: 1.0,
            k2: 0.05,
            k3: 4.0,
            k4: 0.01,
            k5: 4.0,
            d1: 0.002,
            d2: 0.002,
            a_0: 0.0,
            m1_0: 0.0,
            m2_0: 0.0,
            p0_0: 0.2,
            p1_0: 0.0,
            p2_0: 0.0,
            p0_0_with_precursor: 0.0,
            a0_0_with_precursor: 20.0,
            grid: default_grid(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("grid size must be positive")]
    EmptyGrid,

    #[error("time span start {start} must be before end {end}")]
    InvertedTimeSpan { start: f64, end: f64 },

    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f64),

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("precursor square ({row}, {col}) is outside the {grid_size}x{grid_size} grid")]
    SquareOutsideGrid {
        row: usize,
        col: usize,
        grid_size: usize,
    },
}

pub type ParameterResult<T> = Result<T, ParameterError>;

impl Parameters {
    /// Checks the invariants the solver relies on. The store itself accepts
    /// anything; this runs at the gateway boundary.
    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name, value });
            }
        }

        if self.grid_size == 0 {
            return Err(ParameterError::EmptyGrid);
        }

        let (start, end) = self.time_span;
        if start >= end {
            return Err(ParameterError::InvertedTimeSpan { start, end });
        }

        if self.time_step <= 0.0 {
            return Err(ParameterError::NonPositiveTimeStep(self.time_step));
        }

        Ok(())
    }

    /// Number of sample times `start, start + step, ...` up to and including
    /// `end`. Zero for an invalid span or step.
    pub fn frame_count(&self) -> usize {
        let (start, end) = self.time_span;
        if !(self.time_step > 0.0 && end > start) {
            return 0;
        }
        // Small epsilon so that 15.0 / 0.1 lands on 150 and not 149.999...
        ((end - start) / self.time_step + 1e-9).floor() as usize + 1
    }

    fn named_values(&self) -> [(&'static str, f64); 18] {
        [
            ("time_span.start", self.time_span.0),
            ("time_span.end", self.time_span.1),
            ("time_step", self.time_step),
            ("k1", self.k1),
            ("k2", self.k2),
            ("k3", self.k3),
            ("k4", self.k4),
            ("k5", self.k5),
            ("D1", self.d1),
            ("D2", self.d2),
            ("A_0", self.a_0),
            ("M1_0", self.m1_0),
            ("M2_0", self.m2_0),
            ("P0_0", self.p0_0),
            ("P1_0", self.p1_0),
            ("P2_0", self.p2_0),
            ("P0_0_with_precursor", self.p0_0_with_precursor),
            ("A0_0_with_precursor", self.a0_0_with_precursor),
        ]
    }
}

/// Holds the [`Parameters`] being edited. Resets to [`Parameters::default`].
pub type ParameterStore = Store<Parameters>;
