use std::time::{Duration, Instant};

use crate::gateway::SolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastColor {
    Success,
    Warning,
    Error,
}

impl ToastColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            ToastColor::Success => [46, 160, 67],
            ToastColor::Warning => [219, 171, 9],
            ToastColor::Error => [207, 34, 46],
        }
    }
}

/// Short-lived notification shown over the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub color: ToastColor,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            color: ToastColor::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            color: ToastColor::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            color: ToastColor::Error,
            message: message.into(),
        }
    }
}

impl From<&SolveError> for Toast {
    fn from(error: &SolveError) -> Self {
        match error {
            SolveError::InvalidParameters(e) => Toast::warning(e.to_string()),
            SolveError::Timeout => {
                Toast::warning("The solver did not answer in time, try a smaller grid")
            }
            other => Toast::error(other.to_string()),
        }
    }
}

/// Toasts waiting to expire, oldest first.
#[derive(Debug)]
pub struct ToastQueue {
    lifetime: Duration,
    entries: Vec<(Toast, Instant)>,
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.push_at(toast, Instant::now());
    }

    pub fn push_at(&mut self, toast: Toast, now: Instant) {
        self.entries.push((toast, now));
    }

    /// Drops expired toasts and returns the live ones.
    pub fn visible(&mut self, now: Instant) -> impl Iterator<Item = &Toast> {
        let lifetime = self.lifetime;
        self.entries
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < lifetime);
        self.entries.iter().map(|(toast, _)| toast)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
