//! Consecutive-failure budget.

/// Monotonic failure allowance for the worker loop.
///
/// Every failed job attempt spends one unit; nothing refills it. Once the
/// budget is exhausted the loop terminates and the process restarts with a
/// clean slate under its supervisor.
#[derive(Debug)]
pub struct ErrorBudget {
    remaining: u32,
}

impl ErrorBudget {
    pub fn new(limit: u32) -> Self {
        Self { remaining: limit }
    }

    /// Spend one unit. Saturates at zero.
    pub fn spend(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
