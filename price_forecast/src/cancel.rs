//! Cancellation and time budgets for model fitting

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller flips to abandon a running forecast
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Why fitting stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    TimedOut,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Cancelled => f.write_str("cancelled by caller"),
            Interrupt::TimedOut => f.write_str("fit timeout elapsed"),
        }
    }
}

/// Limits applied to one model fit
#[derive(Debug, Clone)]
pub struct FitBudget {
    max_iterations: usize,
    tolerance: f64,
    deadline: Option<Instant>,
    token: Option<CancellationToken>,
}

impl FitBudget {
    /// Budget with an iteration cap and relative convergence tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            deadline: None,
            token: None,
        }
    }

    /// Stop fitting once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Stop fitting when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check the cancellation token and the deadline
    pub fn check(&self) -> std::result::Result<(), Interrupt> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupt::TimedOut);
        }
        Ok(())
    }
}

impl Default for FitBudget {
    fn default() -> Self {
        Self::new(500, 1e-8)
    }
}
