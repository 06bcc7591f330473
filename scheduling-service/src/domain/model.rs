//! Shared plumbing between the solver and the alternative enumerator:
//! the normalized worker view, the decision -> assignment-grid mapping,
//! the greedy role-feasibility check, and signature hashing for
//! alternative deduplication.

use std::collections::{HashMap, HashSet};

use shared::types::{AssignmentGrid, Day, FixedAssignments, WeeklyAvailability, Worker};

use super::capacity::CompiledCapacity;
use super::text::norm;

/// A worker's qualifications and availability, normalized for matching
/// against compiled capacity role names and shift names.
#[derive(Debug, Clone)]
pub struct WorkerView {
    pub name: String,
    pub max_shifts: u32,
    pub roles: HashSet<String>,
    /// day -> set of normalized shift names this worker may work
    pub availability: HashMap<Day, HashSet<String>>,
}

pub fn build_worker_views(
    workers: &[Worker],
    weekly_availability: Option<&WeeklyAvailability>,
) -> Vec<WorkerView> {
    workers
        .iter()
        .map(|w| {
            let availability = match weekly_availability.and_then(|wa| wa.get(&w.name)) {
                Some(ov) => ov
                    .iter()
                    .map(|(d, shifts)| (*d, shifts.iter().map(|s| norm(s)).collect()))
                    .collect(),
                None => w
                    .availability
                    .iter()
                    .map(|(d, shifts)| (*d, shifts.iter().map(|s| norm(s)).collect()))
                    .collect(),
            };
            WorkerView {
                name: w.name.clone(),
                max_shifts: w.max_shifts,
                roles: w.roles.iter().map(|r| norm(r)).collect(),
                availability,
            }
        })
        .collect()
}

/// A single worker's decision for one day: off, or a (shift, station) cell.
pub type DayDecision = Option<(usize, usize)>;

/// `decisions[worker_idx][day_idx]`, index-aligned with `workers` and
/// `capacity.days`.
#[derive(Debug, Clone)]
pub struct Decisions {
    pub rows: Vec<Vec<DayDecision>>,
}

impl Decisions {
    pub fn empty(num_workers: usize, num_days: usize) -> Self {
        Self {
            rows: vec![vec![None; num_days]; num_workers],
        }
    }
}

/// Materializes the decision matrix into the public assignment grid,
/// deduplicating any (defensive, should not occur) repeated name within a
/// (day, shift) across stations and truncating to each cell's required
/// headcount.
pub fn decisions_to_grid(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    decisions: &Decisions,
) -> AssignmentGrid {
    let mut grid: AssignmentGrid = HashMap::new();

    for (day_idx, &day) in capacity.days.iter().enumerate() {
        let mut per_shift: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for (shift_idx, shift_name) in capacity.shifts.iter().enumerate() {
            let mut seen_this_cell: Vec<HashSet<String>> =
                vec![HashSet::new(); capacity.stations.len()];
            let mut rows: Vec<Vec<String>> = vec![Vec::new(); capacity.stations.len()];

            for (worker_idx, worker) in workers.iter().enumerate() {
                if let Some((s, t)) = decisions.rows[worker_idx][day_idx] {
                    if s == shift_idx && seen_this_cell[t].insert(worker.name.clone()) {
                        rows[t].push(worker.name.clone());
                    }
                }
            }

            for (t, row) in rows.iter_mut().enumerate() {
                let required = capacity
                    .cell(day, shift_name, t)
                    .map(|c| c.required_total)
                    .unwrap_or(0) as usize;
                row.truncate(required);
            }
            per_shift.insert(shift_name.clone(), rows);
        }
        grid.insert(day, per_shift);
    }

    grid
}

/// Greedily checks whether `candidate` can be seated alongside
/// `already_seated` in a cell with the given role quotas: each seated
/// worker (including the candidate) consumes one remaining slot from any
/// role they carry, in listed order. Returns false if any worker --
/// including the candidate -- cannot be matched to a role when the cell
/// has role quotas but the worker carries none of them and the
/// role-free capacity is exhausted.
pub fn role_feasible(
    roles: &HashMap<String, i64>,
    required_total: i64,
    already_seated: &[&WorkerView],
    candidate: &WorkerView,
) -> bool {
    if roles.is_empty() {
        return (already_seated.len() as i64) < required_total;
    }

    let mut remaining: HashMap<&str, i64> = roles.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let role_capacity: i64 = remaining.values().sum();
    let mut non_role_seats = required_total - role_capacity;

    let mut seat = |w: &WorkerView, remaining: &mut HashMap<&str, i64>, non_role: &mut i64| -> bool {
        for role in &w.roles {
            if let Some(slot) = remaining.get_mut(role.as_str()) {
                if *slot > 0 {
                    *slot -= 1;
                    return true;
                }
            }
        }
        if *non_role > 0 {
            *non_role -= 1;
            return true;
        }
        false
    };

    for w in already_seated {
        if !seat(w, &mut remaining, &mut non_role_seats) {
            return false;
        }
    }
    seat(candidate, &mut remaining, &mut non_role_seats)
}

/// Pre-resolved pinned decisions, keyed by worker index then day index.
pub fn resolve_pins(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    fixed: Option<&FixedAssignments>,
) -> HashMap<(usize, usize), (usize, usize)> {
    let mut out = HashMap::new();
    let Some(fixed) = fixed else { return out };

    for (&day, by_shift) in fixed {
        let Some(day_idx) = capacity.days.iter().position(|&d| d == day) else {
            continue;
        };
        for (shift_name, by_station) in by_shift {
            let Some(shift_idx) = capacity.shifts.iter().position(|s| s == shift_name) else {
                continue;
            };
            for (&station_idx, names) in by_station {
                for name in names {
                    if let Some(worker_idx) = workers.iter().position(|w| &w.name == name) {
                        out.insert((worker_idx, day_idx), (shift_idx, station_idx));
                    }
                }
            }
        }
    }
    out
}

/// A hashable, order-sensitive fingerprint of an assignment grid, used to
/// deduplicate alternatives. Two grids with the same fingerprint are the
/// same assignment (modulo insertion order within a cell, which the
/// enumerator keeps stable).
pub fn signature(capacity: &CompiledCapacity, decisions: &Decisions, workers: &[WorkerView]) -> u64 {
    use std::hash::{Hash, Hasher};
    let grid = decisions_to_grid(capacity, workers, decisions);
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for &day in &capacity.days {
        day.to_string().hash(&mut hasher);
        for shift in &capacity.shifts {
            shift.hash(&mut hasher);
            if let Some(row) = grid.get(&day).and_then(|m| m.get(shift)) {
                for cell in row {
                    cell.hash(&mut hasher);
                    0xFFu8.hash(&mut hasher); // cell separator
                }
            }
        }
    }
    hasher.finish()
}
