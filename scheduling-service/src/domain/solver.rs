//! The base solver: an explicit branch-and-bound search over
//! per-(worker, day) decisions, equivalent to the boolean `x[w,d,s,t]`
//! formulation but collapsed onto one decision slot per worker per day
//! (legal because "at most one shift per worker per day" is itself a
//! hard constraint). No vetted CP-SAT binding exists in this ecosystem,
//! so the model is realized directly as a deadline-bounded DFS with
//! incremental constraint bookkeeping instead of delegating to an
//! external ILP engine.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use shared::types::SolveStatus;

use super::capacity::CompiledCapacity;
use super::model::{role_feasible, signature, DayDecision, Decisions, WorkerView};
use super::options::SolveOptions;
use super::text::is_night_shift;

const COVERAGE_WEIGHT: f64 = 1_000_000.0;
const MAX_DEV_WEIGHT: f64 = 10_000.0;
const SUM_DEV_WEIGHT: f64 = 100.0;

pub struct SolveResult {
    pub status: SolveStatus,
    pub decisions: Decisions,
    pub objective: f64,
}

struct Search<'a> {
    capacity: &'a CompiledCapacity,
    workers: &'a [WorkerView],
    options: &'a SolveOptions,
    pins: &'a HashMap<(usize, usize), (usize, usize)>,
    forbidden: &'a [u64],
    night_shift: Vec<bool>,
    deadline: Instant,
    exhausted: bool,

    // [day][shift][station] -> worker indices currently seated, insertion order
    occupants: Vec<Vec<Vec<Vec<usize>>>>,
    day_worked: Vec<Vec<bool>>,
    night_count: Vec<u32>,
    total_count: Vec<u32>,
    decisions: Decisions,

    best: Option<(Decisions, f64)>,
}

impl<'a> Search<'a> {
    fn new(
        capacity: &'a CompiledCapacity,
        workers: &'a [WorkerView],
        options: &'a SolveOptions,
        pins: &'a HashMap<(usize, usize), (usize, usize)>,
        forbidden: &'a [u64],
        deadline: Instant,
    ) -> Self {
        let num_days = capacity.days.len();
        let num_shifts = capacity.shifts.len();
        let num_stations = capacity.stations.len();
        let num_workers = workers.len();

        Self {
            capacity,
            workers,
            options,
            pins,
            forbidden,
            night_shift: capacity.shifts.iter().map(|s| is_night_shift(s)).collect(),
            deadline,
            exhausted: true,
            occupants: vec![vec![vec![Vec::new(); num_stations]; num_shifts]; num_days],
            day_worked: vec![vec![false; num_days]; num_workers],
            night_count: vec![0; num_workers],
            total_count: vec![0; num_workers],
            decisions: Decisions::empty(num_workers, num_days),
            best: None,
        }
    }

    fn timed_out(&mut self) -> bool {
        if Instant::now() >= self.deadline {
            self.exhausted = false;
            true
        } else {
            false
        }
    }

    fn candidates(&self, worker_idx: usize, day_idx: usize) -> Vec<DayDecision> {
        if let Some(&(s, t)) = self.pins.get(&(worker_idx, day_idx)) {
            return vec![Some((s, t))];
        }

        let day = self.capacity.days[day_idx];
        let worker = &self.workers[worker_idx];
        let mut out = Vec::new();

        for (shift_idx, shift_name) in self.capacity.shifts.iter().enumerate() {
            let Some(avail) = worker.availability.get(&day) else {
                continue;
            };
            if !avail.contains(shift_name) {
                continue;
            }
            for station_idx in 0..self.capacity.stations.len() {
                let Some(cell) = self.capacity.cell(day, shift_name, station_idx) else {
                    continue;
                };
                if cell.required_total <= 0 {
                    continue;
                }
                out.push(Some((shift_idx, station_idx)));
            }
        }
        out.push(None);
        out
    }

    /// Checks every hard constraint for tentatively placing `worker_idx`
    /// into `decision` on `day_idx`, given the bookkeeping so far.
    fn feasible(&self, worker_idx: usize, day_idx: usize, decision: DayDecision) -> bool {
        let Some((shift_idx, station_idx)) = decision else {
            return true;
        };
        let worker = &self.workers[worker_idx];
        let day = self.capacity.days[day_idx];
        let shift_name = &self.capacity.shifts[shift_idx];

        if !worker
            .availability
            .get(&day)
            .is_some_and(|shifts| shifts.contains(shift_name))
        {
            return false;
        }

        // day-boundary adjacency: last shift of the previous day cannot
        // be immediately followed by the first shift of this one.
        if day_idx > 0 && shift_idx == 0 {
            if let Some((prev_shift, _)) = self.decisions.rows[worker_idx][day_idx - 1] {
                if prev_shift == self.capacity.shifts.len() - 1 {
                    return false;
                }
            }
        }

        if self.night_shift[shift_idx]
            && self.night_count[worker_idx] + 1 > self.options.max_nights_per_worker
        {
            return false;
        }

        if self.total_count[worker_idx] + 1 > worker.max_shifts {
            return false;
        }

        // no 7 consecutive worked days: only binding once a full 7-day
        // window exists in the horizon.
        if day_idx + 1 >= 7 {
            let window_start = day_idx + 1 - 7;
            let mut worked_in_window = 0;
            for d in window_start..day_idx {
                if self.day_worked[worker_idx][d] {
                    worked_in_window += 1;
                }
            }
            if worked_in_window + 1 > 6 {
                return false;
            }
        }

        let Some(cell) = self.capacity.cell(day, shift_name, station_idx) else {
            return false;
        };
        let seated: Vec<&WorkerView> = self.occupants[day_idx][shift_idx][station_idx]
            .iter()
            .map(|&w| &self.workers[w])
            .collect();
        role_feasible(&cell.roles, cell.required_total, &seated, worker)
    }

    fn place(&mut self, worker_idx: usize, day_idx: usize, decision: DayDecision) {
        self.decisions.rows[worker_idx][day_idx] = decision;
        if let Some((shift_idx, station_idx)) = decision {
            self.occupants[day_idx][shift_idx][station_idx].push(worker_idx);
            self.day_worked[worker_idx][day_idx] = true;
            self.total_count[worker_idx] += 1;
            if self.night_shift[shift_idx] {
                self.night_count[worker_idx] += 1;
            }
        }
    }

    fn unplace(&mut self, worker_idx: usize, day_idx: usize, decision: DayDecision) {
        self.decisions.rows[worker_idx][day_idx] = None;
        if let Some((shift_idx, station_idx)) = decision {
            self.occupants[day_idx][shift_idx][station_idx].retain(|&w| w != worker_idx);
            self.day_worked[worker_idx][day_idx] = false;
            self.total_count[worker_idx] -= 1;
            if self.night_shift[shift_idx] {
                self.night_count[worker_idx] -= 1;
            }
        }
    }

    fn objective(&self) -> f64 {
        let coverage: u32 = self.total_count.iter().sum();
        let devs: Vec<i64> = self
            .workers
            .iter()
            .zip(&self.total_count)
            .map(|(w, &c)| (c as i64 - w.max_shifts as i64).abs())
            .collect();
        let max_dev = devs.iter().copied().max().unwrap_or(0);
        let sum_dev: i64 = devs.iter().sum();
        COVERAGE_WEIGHT * coverage as f64 - MAX_DEV_WEIGHT * max_dev as f64 - SUM_DEV_WEIGHT * sum_dev as f64
    }

    fn consider_leaf(&mut self) {
        let sig = signature(self.capacity, &self.decisions, self.workers);
        if self.forbidden.contains(&sig) {
            return;
        }
        let obj = self.objective();
        if self.best.as_ref().map(|(_, b)| obj > *b).unwrap_or(true) {
            self.best = Some((self.decisions.clone(), obj));
        }
    }

    fn recurse(&mut self, pos: usize) {
        if self.timed_out() {
            return;
        }
        let num_workers = self.workers.len();
        let num_days = self.capacity.days.len();
        let total = num_workers * num_days;

        if pos == total {
            self.consider_leaf();
            return;
        }

        let day_idx = pos / num_workers;
        let worker_idx = pos % num_workers;

        for decision in self.candidates(worker_idx, day_idx) {
            if self.timed_out() {
                return;
            }
            if !self.feasible(worker_idx, day_idx, decision) {
                continue;
            }
            self.place(worker_idx, day_idx, decision);
            self.recurse(pos + 1);
            self.unplace(worker_idx, day_idx, decision);
        }
    }
}

/// Runs the branch-and-bound search to completion or deadline, returning
/// the best feasible decision matrix found. `forbidden` carries
/// signatures of solutions a no-good re-solve must exclude (empty for
/// the base solve).
pub fn solve(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    options: &SolveOptions,
    pins: &HashMap<(usize, usize), (usize, usize)>,
    forbidden: &[u64],
) -> SolveResult {
    if workers.is_empty() {
        return SolveResult {
            status: SolveStatus::NoWorkers,
            decisions: Decisions::empty(0, capacity.days.len()),
            objective: 0.0,
        };
    }

    let deadline = Instant::now() + options.time_limit;
    let mut search = Search::new(capacity, workers, options, pins, forbidden, deadline);
    search.recurse(0);

    match search.best {
        Some((decisions, objective)) => SolveResult {
            status: if search.exhausted {
                SolveStatus::Optimal
            } else {
                SolveStatus::Feasible
            },
            decisions,
            objective,
        },
        None => SolveResult {
            status: SolveStatus::Infeasible,
            decisions: Decisions::empty(workers.len(), capacity.days.len()),
            objective: 0.0,
        },
    }
}

/// A generous default per-node deadline used by the no-good re-solver,
/// separate from the base solve's full budget.
pub fn resolve_deadline(time_limit: Duration) -> Duration {
    time_limit.max(Duration::from_secs(1))
}

/// Replays a complete, externally-constructed decision matrix (e.g. one
/// produced by a local move) through the same incremental constraint
/// checks the search uses, in day-major order. Used by the alternative
/// enumerator to validate a candidate swap without duplicating the hard
/// constraint logic.
pub fn validate_full(
    capacity: &CompiledCapacity,
    workers: &[WorkerView],
    options: &SolveOptions,
    pins: &HashMap<(usize, usize), (usize, usize)>,
    decisions: &Decisions,
) -> bool {
    let far_future = Instant::now() + Duration::from_secs(3600);
    let mut search = Search::new(capacity, workers, options, pins, &[], far_future);
    let num_workers = workers.len();
    let num_days = capacity.days.len();

    for day_idx in 0..num_days {
        for worker_idx in 0..num_workers {
            let decision = decisions.rows[worker_idx][day_idx];
            if let Some(&pinned) = pins.get(&(worker_idx, day_idx)) {
                if decision != Some(pinned) {
                    return false;
                }
            }
            if !search.feasible(worker_idx, day_idx, decision) {
                return false;
            }
            search.place(worker_idx, day_idx, decision);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capacity::compile;
    use crate::domain::model::build_worker_views;
    use shared::types::{Day, RoleCount, ShiftConfig, SiteConfig, StationConfig, Worker};
    use std::collections::HashMap as Map;

    fn single_station_site(required: i64, roles: Vec<RoleCount>) -> SiteConfig {
        let mut days = Map::new();
        for d in Day::ALL {
            days.insert(d, true);
        }
        let shifts = vec![
            ShiftConfig { name: "06-14".into(), enabled: true, workers: required, roles: roles.clone() },
            ShiftConfig { name: "14-22".into(), enabled: true, workers: required, roles: roles.clone() },
            ShiftConfig { name: "22-06".into(), enabled: true, workers: required, roles },
        ];
        SiteConfig {
            stations: vec![StationConfig {
                name: "Gate".into(),
                per_day_custom: false,
                days,
                shifts,
                day_overrides: Map::new(),
                uniform_roles: false,
                workers: 0,
                roles: vec![],
            }],
        }
    }

    fn available_everywhere(name: &str, max_shifts: u32) -> Worker {
        let mut availability = Map::new();
        for d in Day::ALL {
            availability.insert(d, vec!["06-14".into(), "14-22".into(), "22-06".into()]);
        }
        Worker {
            id: name.into(),
            name: name.into(),
            max_shifts,
            roles: vec![],
            availability,
        }
    }

    #[test]
    fn no_workers_yields_no_workers_status() {
        let config = single_station_site(1, vec![]);
        let capacity = compile(&config, &[]);
        let options = SolveOptions::default();
        let result = solve(&capacity, &[], &options, &Map::new(), &[]);
        assert_eq!(result.status, SolveStatus::NoWorkers);
    }

    #[test]
    fn single_worker_never_gets_adjacent_shifts_across_day_boundary() {
        let config = single_station_site(1, vec![]);
        let capacity = compile(&config, &[]);
        let worker = available_everywhere("Dana", 5);
        let workers = build_worker_views(&[worker], None);
        let options = SolveOptions::default();
        let result = solve(&capacity, &workers, &options, &Map::new(), &[]);

        assert!(matches!(result.status, SolveStatus::Optimal | SolveStatus::Feasible));
        for day in 0..capacity.days.len() - 1 {
            let last_shift = capacity.shifts.len() - 1;
            let today_last = result.decisions.rows[0][day] == Some((last_shift, 0));
            let tomorrow_first = result.decisions.rows[0][day + 1] == Some((0, 0));
            assert!(!(today_last && tomorrow_first));
        }
    }

    #[test]
    fn night_cap_is_respected() {
        let config = single_station_site(1, vec![]);
        let capacity = compile(&config, &[]);
        let worker = available_everywhere("Dana", 7);
        let workers = build_worker_views(&[worker], None);
        let mut options = SolveOptions::default();
        options.max_nights_per_worker = 3;
        let result = solve(&capacity, &workers, &options, &Map::new(), &[]);

        let night_idx = capacity.shifts.len() - 1;
        let nights = result.decisions.rows[0]
            .iter()
            .filter(|d| **d == Some((night_idx, 0)))
            .count();
        assert!(nights <= 3);
    }

    #[test]
    fn role_reservation_never_assigns_non_role_carrier_to_fill_shortfall() {
        let roles = vec![RoleCount { name: "supervisor".into(), enabled: true, count: 1 }];
        let config = single_station_site(1, roles);
        let capacity = compile(&config, &[]);
        let guard = available_everywhere("Guard", 5);
        let workers = build_worker_views(&[guard], None);
        let options = SolveOptions::default();
        let result = solve(&capacity, &workers, &options, &Map::new(), &[]);

        // the lone worker carries no roles, so every cell's supervisor seat
        // must stay empty rather than being filled by them.
        for day in 0..capacity.days.len() {
            assert_eq!(result.decisions.rows[0][day], None);
        }
    }
}
