//! The four stores of one viewer session, owned together.
//!
//! A `Session` is built explicitly and passed to whatever needs it, so tests
//! can run any number of isolated sessions side by side.

use std::cell::Cell;

use log::debug;

use crate::camera::CameraStore;
use crate::gateway::{SolveError, SolveGateway, SolveRequest};
use crate::parameters::ParameterStore;
use crate::precursor::PrecursorSquareStore;
use crate::solution::{Solution, SolutionStore};

/// Identifies one issued solve. Only the most recently issued ticket may
/// publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SolveTicket(u64);

#[derive(Debug, Default)]
pub struct Session {
    pub parameters: ParameterStore,
    pub solution: SolutionStore,
    pub precursor_squares: PrecursorSquareStore,
    pub camera: CameraStore,
    issued: Cell<u64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the snapshot to send and issues a ticket for it. Any ticket
    /// issued earlier becomes stale.
    pub fn begin_solve(&self) -> (SolveTicket, SolveRequest) {
        let generation = self.issued.get() + 1;
        self.issued.set(generation);

        let request = SolveRequest::new(
            (*self.parameters.get()).clone(),
            (*self.precursor_squares.get()).clone(),
        );
        debug!(
            "solve #{generation}: captured grid {} with {} precursor squares",
            request.parameters.grid_size,
            request.precursor_squares.len()
        );
        (SolveTicket(generation), request)
    }

    /// Publishes the outcome of the solve identified by `ticket`.
    ///
    /// Errors are handed back and leave the solution store untouched.
    /// Results of a stale ticket are dropped; `Ok(false)` reports that.
    pub fn complete_solve(
        &self,
        ticket: SolveTicket,
        result: Result<Solution, SolveError>,
    ) -> Result<bool, SolveError> {
        let solution = result?;

        if !self.is_current(ticket) {
            debug!(
                "solve #{} superseded by #{}, dropping its result",
                ticket.0,
                self.issued.get()
            );
            return Ok(false);
        }

        self.solution.set(Some(solution));
        Ok(true)
    }

    /// Captures a snapshot, runs it through `gateway` and publishes the
    /// result. Stores stay writable while the request is pending.
    pub async fn solve(&self, gateway: &SolveGateway) -> Result<bool, SolveError> {
        let (ticket, request) = self.begin_solve();
        let result = gateway.solve(&request).await;
        self.complete_solve(ticket, result)
    }

    pub fn is_current(&self, ticket: SolveTicket) -> bool {
        ticket.0 == self.issued.get()
    }

    pub fn reset_all(&self) {
        debug!("resetting session stores");
        self.parameters.reset();
        self.solution.reset();
        self.precursor_squares.reset();
        self.camera.reset();
    }
}
