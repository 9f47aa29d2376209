//! HTTP client for the remote eyespot solver.
//!
//! The gateway never reads a store. Callers hand it an owned [`SolveRequest`]
//! captured before the call, so edits made while a solve is in flight cannot
//! leak into it.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parameters::{ParameterError, Parameters};
use crate::precursor::Square;
use crate::solution::Solution;

const SOLVER_URL_ENV: &str = "EYESPOT_SOLVER_URL";
const SOLVER_TIMEOUT_ENV: &str = "EYESPOT_SOLVER_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SOLVE_PATH: &str = "/solve";
/// Large grids take minutes to integrate and the call is synchronous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub solve_path: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            solve_path: DEFAULT_SOLVE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by `EYESPOT_SOLVER_URL` and
    /// `EYESPOT_SOLVER_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(SOLVER_URL_ENV) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }

        if let Some(raw) = lookup(SOLVER_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    "ignoring {SOLVER_TIMEOUT_ENV}={raw:?}, keeping {}s",
                    config.timeout.as_secs()
                ),
            }
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn solve_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.solve_path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error("could not build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("the solver did not answer within the timeout")]
    Timeout,

    #[error("could not reach the solver: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("solver answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode the solver response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("solver returned a malformed solution: {0}")]
    MalformedSolution(String),
}

pub type SolveResult<T> = Result<T, SolveError>;

impl SolveError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SolveError::Timeout | SolveError::Transport(_) => true,
            SolveError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SolveError::Timeout
        } else {
            SolveError::Transport(error)
        }
    }
}

/// Immutable snapshot sent to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub parameters: Parameters,
    pub precursor_squares: Vec<Square>,
}

impl SolveRequest {
    pub fn new(parameters: Parameters, precursor_squares: Vec<Square>) -> Self {
        Self {
            parameters,
            precursor_squares,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        self.parameters.validate()?;

        let grid_size = self.parameters.grid_size;
        if let Some(square) = self
            .precursor_squares
            .iter()
            .find(|square| !square.is_within(grid_size))
        {
            return Err(ParameterError::SquareOutsideGrid {
                row: square.row,
                col: square.col,
                grid_size,
            });
        }

        Ok(())
    }
}

pub struct SolveGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl SolveGateway {
    pub fn new(config: GatewayConfig) -> SolveResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(SolveError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Submits `request` and waits for the solver's answer.
    ///
    /// The returned solution has been checked against the request's grid
    /// size. Publishing it is up to the caller.
    pub async fn solve(&self, request: &SolveRequest) -> SolveResult<Solution> {
        request.validate()?;

        let url = self.config.solve_url();
        let started = Instant::now();
        info!(
            "submitting solve to {url}: grid {}x{}, {} precursor squares",
            request.parameters.grid_size,
            request.parameters.grid_size,
            request.precursor_squares.len()
        );

        let result = self.submit(&url, request).await;
        match &result {
            Ok(solution) => info!(
                "solve finished in {:.1}s with {} frames",
                started.elapsed().as_secs_f32(),
                solution.frame_count()
            ),
            Err(e) => warn!(
                "solve failed after {:.1}s: {e}",
                started.elapsed().as_secs_f32()
            ),
        }
        result
    }

    async fn submit(&self, url: &str, request: &SolveRequest) -> SolveResult<Solution> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(SolveError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("could not read body of {status} response from solver: {e}");
                    String::new()
                }
            };
            return Err(SolveError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(SolveError::from_reqwest)?;
        debug!("solver response: {} bytes", bytes.len());

        let solution: Solution = serde_json::from_slice(&bytes)?;
        if solution.grid_size != request.parameters.grid_size {
            return Err(SolveError::MalformedSolution(format!(
                "grid size {} does not match requested {}",
                solution.grid_size, request.parameters.grid_size
            )));
        }
        solution
            .check_shape()
            .map_err(SolveError::MalformedSolution)?;

        Ok(solution)
    }
}
