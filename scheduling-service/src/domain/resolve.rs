//! No-good re-solver: repeatedly forbids the exact solution just found
//! and re-solves, to surface alternatives the local-move enumerator's
//! swap families cannot reach (structurally different schedules rather
//! than small perturbations of the base).

use std::collections::{HashMap, HashSet};

use shared::types::SolveStatus;

use super::capacity::CompiledCapacity;
use super::model::{signature, Decisions, WorkerView};
use super::options::SolveOptions;
use super::solver::{resolve_deadline, solve};

/// Re-solves up to `budget` times, each time forbidding every signature
/// already produced (base, prior local-move alternatives, and prior
/// re-solves). Stops early on infeasibility or once the deadline-bounded
/// search stops finding anything new within `max_attempts`.
pub fn resolve_alternatives(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    options: &SolveOptions,
    pins: &HashMap<(usize, usize), (usize, usize)>,
    base_coverage: u32,
    seen: &mut HashSet<u64>,
    budget: u32,
) -> Vec<Decisions> {
    let mut out = Vec::new();
    if budget == 0 || workers.is_empty() {
        return out;
    }

    let mut resolve_options = *options;
    resolve_options.time_limit = resolve_deadline(options.time_limit);

    let max_attempts = budget.saturating_mul(3).max(budget);
    let mut forbidden: Vec<u64> = seen.iter().copied().collect();

    for _ in 0..max_attempts {
        if out.len() as u32 >= budget {
            break;
        }
        let result = solve(capacity, workers, &resolve_options, pins, &forbidden);
        match result.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                let sig = signature(capacity, &result.decisions, workers);
                forbidden.push(sig);
                let coverage: u32 = result
                    .decisions
                    .rows
                    .iter()
                    .flat_map(|row| row.iter())
                    .filter(|d| d.is_some())
                    .count() as u32;
                if coverage != base_coverage || !seen.insert(sig) {
                    continue;
                }
                tracing::info!(signature = sig, "no-good re-solve produced a new alternative");
                out.push(result.decisions);
            }
            SolveStatus::Infeasible | SolveStatus::NoWorkers => break,
            SolveStatus::Error => break,
        }
    }

    out
}

pub fn default_resolve_budget(requested: u32, already_produced: u32) -> u32 {
    requested.saturating_sub(already_produced)
}
