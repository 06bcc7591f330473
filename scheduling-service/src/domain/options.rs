//! Request-level knobs for a single solve, with the defaults the original
//! service applies when a request omits them.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    pub time_limit: Duration,
    pub max_nights_per_worker: u32,
    pub num_alternatives: u32,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            max_nights_per_worker: 3,
            num_alternatives: 20,
        }
    }
}

impl SolveOptions {
    /// Applies request-supplied overrides (e.g. the query-parameter
    /// shadowing an embedding HTTP layer performs) on top of the defaults.
    pub fn with_overrides(
        mut self,
        time_limit_seconds: Option<u64>,
        max_nights_per_worker: Option<u32>,
        num_alternatives: Option<u32>,
    ) -> Self {
        if let Some(secs) = time_limit_seconds {
            self.time_limit = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = max_nights_per_worker {
            self.max_nights_per_worker = n;
        }
        if let Some(n) = num_alternatives {
            self.num_alternatives = n;
        }
        self
    }
}
