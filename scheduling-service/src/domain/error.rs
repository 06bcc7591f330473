use thiserror::Error;

/// Truly exceptional conditions raised while building or extracting a
/// solution. Ordinary solver outcomes (infeasible, no workers, etc.) are
/// not errors -- they are [`shared::types::SolveStatus`] values flowing
/// through the normal `Ok` path; see the streaming driver.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal invariant violated while extracting solution: {0}")]
    Internal(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
